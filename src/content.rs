//! Greeting content: the persisted customization record and letter text parsing.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ContentError;
use crate::letter::Signature;

const DEFAULT_MESSAGES: [&str; 4] = [
    "Happy Birthday!",
    "Another year of you.",
    "Lucky everyone who knows you.",
    "I wrote you something...",
];

const DEFAULT_LETTER: [&str; 3] = [
    "Today is all about you, and I wanted to put into words how much you mean to me.",
    "Every year with you has been full of laughter, small adventures and quiet \
evenings I would not trade for anything.",
    "I hope this year brings you everything you have been wishing for. Happy birthday!",
];

/// The user's saved customization. Missing fields fall back to the birthday defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customization {
    pub messages: Vec<String>,
    /// One string per paragraph, or a single string of plain text or simple HTML.
    pub letter_text: LetterContent,
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect(),
            letter_text: LetterContent::Paragraphs(DEFAULT_LETTER.iter().map(|p| p.to_string()).collect()),
            signature: Signature::default().name,
            last_modified: None,
        }
    }
}

impl Customization {
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let raw = fs::read_to_string(path)?;
        let customization = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            messages = customization.messages.len(),
            last_modified = ?customization.last_modified,
            "customization loaded"
        );
        Ok(customization)
    }

    /// Parses and tidies a record: blank messages and paragraphs are dropped, a
    /// blank signature falls back to the default name.
    pub fn from_json(raw: &str) -> Result<Self, ContentError> {
        let mut customization: Customization = serde_json::from_str(raw)?;
        customization.messages = customization
            .messages
            .iter()
            .map(|message| message.trim())
            .filter(|message| !message.is_empty())
            .map(str::to_owned)
            .collect();
        if let LetterContent::Paragraphs(paragraphs) = &mut customization.letter_text {
            paragraphs.retain(|paragraph| !paragraph.trim().is_empty());
        }
        customization.signature = customization.signature.trim().to_string();
        if customization.signature.is_empty() {
            customization.signature = Signature::default().name;
        }
        if customization.messages.is_empty() && customization.paragraphs().is_empty() {
            return Err(ContentError::Empty);
        }
        Ok(customization)
    }

    pub fn letter(&self) -> LetterContent {
        self.letter_text.clone()
    }

    pub fn paragraphs(&self) -> Vec<String> {
        self.letter().into_paragraphs()
    }

    pub fn signature(&self) -> Signature {
        Signature {
            name: self.signature.clone(),
            ..Signature::default()
        }
    }
}

/// Letter body: ready-made paragraphs, or text/HTML still to be split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LetterContent {
    Paragraphs(Vec<String>),
    Html(String),
}

impl LetterContent {
    pub fn into_paragraphs(self) -> Vec<String> {
        match self {
            LetterContent::Paragraphs(paragraphs) => paragraphs,
            LetterContent::Html(html) => split_html(&html),
        }
    }
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Paragraph breaks: `<p>`/`</p>`, two `<br>`s in a row, and blank lines.
fn split_html(html: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    let mut after_br = false;
    let mut rest = html;

    while let Some(open) = rest.find('<') {
        let (text, tail) = rest.split_at(open);
        if !text.trim().is_empty() {
            after_br = false;
        }
        current.push_str(text);
        let Some(close) = tail.find('>') else {
            current.push_str(tail);
            rest = "";
            break;
        };
        match tag_name(&tail[1..close]).as_str() {
            "p" | "div" => {
                blocks.push(std::mem::take(&mut current));
                after_br = false;
            }
            "br" if after_br => {
                blocks.push(std::mem::take(&mut current));
                after_br = false;
            }
            "br" => {
                current.push('\n');
                after_br = true;
            }
            _ => {}
        }
        rest = &tail[close + 1..];
    }
    current.push_str(rest);
    blocks.push(current);

    let paragraphs: Vec<String> = blocks
        .iter()
        .flat_map(|block| split_blank_lines(block))
        .map(|block| decode_entities(&block))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .collect();
    debug!(paragraphs = paragraphs.len(), "letter text parsed");
    paragraphs
}

fn split_blank_lines(block: &str) -> Vec<String> {
    let mut parts = vec![String::new()];
    for line in block.lines() {
        if line.trim().is_empty() {
            parts.push(String::new());
        } else if let Some(last) = parts.last_mut() {
            last.push_str(line);
            last.push('\n');
        }
    }
    parts
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(text: &str) -> Vec<String> {
        LetterContent::Html(text.to_string()).into_paragraphs()
    }

    #[test]
    fn paragraph_tags_and_double_breaks_split() {
        assert_eq!(
            html("<p>First one.</p>\n<p class=\"x\">Second\n  line.</p>"),
            vec!["First one.", "Second line."]
        );
        assert_eq!(
            html("Hello<br>there<br/><br />Again"),
            vec!["Hello there", "Again"]
        );
        assert_eq!(html("One.\n\n  \nTwo."), vec!["One.", "Two."]);
        assert!(html("<p> </p><br><br>").is_empty());
    }

    #[test]
    fn tags_are_stripped_and_entities_decoded() {
        assert_eq!(
            html("<p><b>Fish</b> &amp; chips &lt;3 &#233;t&#xE9; &unknown; AT&T</p>"),
            vec!["Fish & chips <3 été &unknown; AT&T"]
        );
    }

    #[test]
    fn plain_paragraphs_pass_through_verbatim() {
        let paragraphs = vec!["  keep   me  ".to_string()];
        assert_eq!(
            LetterContent::Paragraphs(paragraphs.clone()).into_paragraphs(),
            paragraphs
        );
    }

    #[test]
    fn record_fields_are_camel_case() {
        let customization = Customization::from_json(
            r#"{
                "messages": ["  Hi  ", "", "Bye"],
                "letterText": "<p>Dear you</p>",
                "signature": "  ",
                "lastModified": "2024-05-01T10:30:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(customization.messages, vec!["Hi", "Bye"]);
        assert_eq!(customization.paragraphs(), vec!["Dear you"]);
        assert_eq!(customization.signature, "Me");
        assert_eq!(
            customization.last_modified.map(|at| at.to_rfc3339()),
            Some("2024-05-01T10:30:00+00:00".to_string())
        );
    }

    #[test]
    fn letter_text_accepts_a_paragraph_list() {
        let customization = Customization::from_json(
            r#"{
                "messages": ["Hi"],
                "letterText": ["First paragraph.", "  ", "Second one."],
                "signature": "Sam",
                "lastModified": "2024-05-01T10:30:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(customization.paragraphs(), vec!["First paragraph.", "Second one."]);
        assert_eq!(customization.signature().name, "Sam");

        let saved = serde_json::to_value(&customization).unwrap();
        assert_eq!(
            saved["letterText"],
            serde_json::json!(["First paragraph.", "Second one."])
        );
    }

    #[test]
    fn missing_fields_use_the_defaults() {
        let customization = Customization::from_json(r#"{"signature": "Alex"}"#).unwrap();
        assert_eq!(customization.messages.len(), DEFAULT_MESSAGES.len());
        assert_eq!(customization.paragraphs().len(), 3);
        assert_eq!(customization.signature().name, "Alex");
        assert_eq!(customization.signature().closing, Signature::default().closing);
    }

    #[test]
    fn empty_or_broken_records_are_rejected() {
        assert!(matches!(
            Customization::from_json(r#"{"messages": [" "], "letterText": "<p></p>"}"#),
            Err(ContentError::Empty)
        ));
        assert!(matches!(
            Customization::from_json(r#"{"messages": [], "letterText": ["", " "]}"#),
            Err(ContentError::Empty)
        ));
        assert!(matches!(
            Customization::from_json(r#"{"letterText": 42}"#),
            Err(ContentError::Json(_))
        ));
        assert!(matches!(
            Customization::from_json("{not json"),
            Err(ContentError::Json(_))
        ));
        assert!(matches!(
            Customization::load(Path::new("/definitely/not/here.json")),
            Err(ContentError::Io(_))
        ));
    }

    #[test]
    fn loads_from_disk() {
        let path = std::env::temp_dir().join(format!("greeting-content-{}.json", std::process::id()));
        fs::write(&path, r#"{"messages": ["Surprise!"]}"#).unwrap();
        let customization = Customization::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(customization.messages, vec!["Surprise!"]);
    }
}
