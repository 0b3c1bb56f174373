//! Descriptive statistics over generated text.
//!
//! Counting conventions:
//! - **characters**: Unicode scalar values (`char`s), not bytes. `"é"` is 1,
//!   a multi-codepoint emoji sequence counts each codepoint.
//! - **paragraphs**: line endings are normalised (`\r\n` → `\n`) and the
//!   text is trimmed of surrounding whitespace; blank text has 0 paragraphs,
//!   otherwise the count is the number of pieces produced by splitting on
//!   `"\n\n"`. Interior empty pieces (three or more consecutive newlines)
//!   are counted; leading and trailing blank lines are not.
//! - **sentences**: pieces between [`SENTENCE_TERMINATOR`] marks that are
//!   non-empty after trimming, so a trailing terminator adds nothing.
//! - **emoji**: occurrences of any glyph in [`EMOJI_ALLOW_LIST`].

use serde::Serialize;

/// Sentence-terminating mark (ideographic full stop).
pub const SENTENCE_TERMINATOR: char = '。';

/// Glyphs counted by the emoji metric.
pub const EMOJI_ALLOW_LIST: [char; 7] = ['😀', '😃', '😄', '😁', '😅', '😂', '🤣'];

/// Statistics for one piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub characters: usize,
    pub paragraphs: usize,
    pub sentences: usize,
    pub emoji: usize,
}

impl AnalysisResult {
    /// Metric name → count, in display order.
    pub fn metrics(&self) -> [(&'static str, usize); 4] {
        [
            ("characters", self.characters),
            ("paragraphs", self.paragraphs),
            ("sentences", self.sentences),
            ("emoji", self.emoji),
        ]
    }
}

/// Analyze `text`. Pure and deterministic.
pub fn analyze(text: &str) -> AnalysisResult {
    AnalysisResult {
        characters: text.chars().count(),
        paragraphs: count_paragraphs(text),
        sentences: text
            .split(SENTENCE_TERMINATOR)
            .filter(|s| !s.trim().is_empty())
            .count(),
        emoji: text.chars().filter(|c| EMOJI_ALLOW_LIST.contains(c)).count(),
    }
}

fn count_paragraphs(text: &str) -> usize {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        0
    } else {
        trimmed.split("\n\n").count()
    }
}
