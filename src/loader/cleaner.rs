// file: src/loader/cleaner.rs
// description: whitespace normalization for text extracted from pdf pages
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HORIZONTAL_WS: Regex = Regex::new(r"[ \t\u{00A0}\u{000C}]+").unwrap();
    static ref TRAILING_WS: Regex = Regex::new(r"(?m) +$").unwrap();
    static ref BLANK_RUNS: Regex = Regex::new(r"\n{3,}").unwrap();
    // Any hyphen at a line end before a lowercase letter is treated as a
    // soft hyphen, so compounds split there ("well-\nknown") lose it too.
    static ref HYPHEN_BREAK: Regex = Regex::new(r"(\p{L})-\n(\p{Ll})").unwrap();
}

/// Paragraph breaks (`\n\n`) survive cleaning; the splitter relies on them.
pub struct TextCleaner;

impl TextCleaner {
    pub fn new() -> Self {
        Self
    }

    pub fn clean(&self, text: &str) -> String {
        let text = text.replace("\r\n", "\n").replace('\r', "\n").replace('\0', "");
        let text = HORIZONTAL_WS.replace_all(&text, " ");
        let text = TRAILING_WS.replace_all(&text, "");
        let text = HYPHEN_BREAK.replace_all(&text, "$1$2");
        let text = BLANK_RUNS.replace_all(&text, "\n\n");
        text.trim().to_string()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_spaces_and_blank_runs() {
        let cleaner = TextCleaner::new();
        let cleaned = cleaner.clean("  Title\t\tline   \r\n\r\n\r\n\nBody  text \n");
        assert_eq!(cleaned, "Title line\n\nBody text");
    }

    #[test]
    fn test_joins_hyphenated_words() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("retrie-\nval"), "retrieval");
        assert_eq!(cleaner.clean("Multi-\nFactor"), "Multi-\nFactor");
    }

    #[test]
    fn test_compound_at_line_end_loses_hyphen() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("a well-\nknown result"), "a wellknown result");
        assert_eq!(cleaner.clean("well- known"), "well- known");
    }

    #[test]
    fn test_keeps_paragraph_breaks() {
        let cleaner = TextCleaner::new();
        assert_eq!(cleaner.clean("one\n\ntwo"), "one\n\ntwo");
    }
}
