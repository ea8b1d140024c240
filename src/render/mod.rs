//! Presenters: a headless terminal one and, with the `window` feature, a raylib window.

pub mod console;
#[cfg(feature = "window")]
pub mod window;

/// Greedy word wrap at `max_chars` columns. Words longer than a line get a line of their own.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
        assert_eq!(wrap("supercalifragilistic is long", 8), vec!["supercalifragilistic", "is long"]);
        assert!(wrap("   ", 10).is_empty());
    }
}
