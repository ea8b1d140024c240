use std::time::Duration;

use crate::constants::SENTENCE_PAUSE_FACTOR;

/// Pause after `word`: longer when it closes a sentence.
pub fn word_pause(word: &str, word_delay: Duration) -> Duration {
    if word.ends_with(['.', '!', '?']) {
        word_delay * SENTENCE_PAUSE_FACTOR
    } else {
        word_delay
    }
}

/// Time needed to type `text` word by word, trailing pause included.
pub fn typing_duration(text: &str, word_delay: Duration) -> Duration {
    text.split_whitespace()
        .map(|word| word_pause(word, word_delay))
        .sum()
}

/// Word-by-word reveal of one paragraph.
///
/// Word `k` appears once the pauses of the `k` words before it have elapsed.
/// The partial text joins words with single spaces, so [`Typewriter::finish`]
/// hands back the untouched original.
#[derive(Debug, Clone)]
pub struct Typewriter {
    original: String,
    words: Vec<String>,
    reveal_at: Vec<Duration>,
    shown: usize,
    started: Duration,
    active: bool,
}

impl Typewriter {
    pub fn new(text: &str, word_delay: Duration, started: Duration) -> Self {
        let words: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
        let mut reveal_at = Vec::with_capacity(words.len());
        let mut offset = Duration::ZERO;
        for word in words.iter() {
            reveal_at.push(offset);
            offset += word_pause(word, word_delay);
        }
        Self {
            original: text.to_owned(),
            words,
            reveal_at,
            shown: 0,
            started,
            active: true,
        }
    }

    /// Reveals every word due by `now`. Returns whether anything changed.
    pub fn advance_to(&mut self, now: Duration) -> bool {
        let before = self.shown;
        let elapsed = now.saturating_sub(self.started);
        while self.active
            && self.shown < self.words.len()
            && self.reveal_at[self.shown] <= elapsed
        {
            self.shown += 1;
        }
        self.shown != before
    }

    pub fn visible_text(&self) -> String {
        self.words[..self.shown].join(" ")
    }

    /// Stops revealing further words.
    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn finish(&mut self) -> &str {
        self.shown = self.words.len();
        self.active = false;
        &self.original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn sentence_endings_triple_the_pause() {
        assert_eq!(word_pause("day", ms(80)), ms(80));
        assert_eq!(word_pause("day.", ms(80)), ms(240));
        assert_eq!(word_pause("wow!", ms(80)), ms(240));
        assert_eq!(word_pause("really?", ms(80)), ms(240));
        assert_eq!(word_pause("however,", ms(80)), ms(80));
        assert_eq!(typing_duration("Hi there. You", ms(10)), ms(50));
        assert_eq!(typing_duration("   ", ms(10)), Duration::ZERO);
    }

    #[test]
    fn words_appear_on_their_schedule() {
        let mut typewriter = Typewriter::new("Hi there. You rock", ms(10), ms(1000));

        assert!(typewriter.advance_to(ms(1000)));
        assert_eq!(typewriter.visible_text(), "Hi");
        assert!(!typewriter.advance_to(ms(1009)));
        assert!(typewriter.advance_to(ms(1010)));
        assert_eq!(typewriter.visible_text(), "Hi there.");
        // "there." holds for three word delays.
        assert!(!typewriter.advance_to(ms(1039)));
        typewriter.advance_to(ms(1040));
        assert_eq!(typewriter.visible_text(), "Hi there. You");
        typewriter.advance_to(ms(5000));
        assert_eq!(typewriter.visible_text(), "Hi there. You rock");
    }

    #[test]
    fn cancel_freezes_mid_paragraph() {
        let mut typewriter = Typewriter::new("one two three", ms(10), Duration::ZERO);
        typewriter.advance_to(ms(10));
        typewriter.cancel();

        assert!(!typewriter.advance_to(ms(1000)));
        assert_eq!(typewriter.visible_text(), "one two");
    }

    #[test]
    fn finish_restores_the_original_bytes() {
        let original = "  Spaces   and\ttabs,\nnewlines too!  ";
        let mut typewriter = Typewriter::new(original, ms(5), Duration::ZERO);
        typewriter.advance_to(ms(12));
        assert_eq!(typewriter.visible_text(), "Spaces and tabs,");

        assert_eq!(typewriter.finish(), original);
        assert_eq!(typewriter.visible_text(), "Spaces and tabs, newlines too!");
    }
}
