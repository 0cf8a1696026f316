//! Verse segmentation of stored lyric text
//!
//! A verse is a block of text delimited by a blank line (two consecutive line
//! breaks). Verses are addressed by 1-based position. Segment boundaries are
//! exact: nothing is trimmed or normalized beyond the split itself.
//!
//! Text stored with single line breaks only yields one segment.

use thiserror::Error;

/// Separator between verses
pub const VERSE_SEPARATOR: &str = "\n\n";

/// Verse selection failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerseError {
    /// Index is zero or negative; rejected without looking at the text
    #[error("Invalid verse number: {0}")]
    InvalidIndex(i64),

    /// Index is beyond the number of verses in the text
    #[error("Verse {index} not found ({available} available)")]
    NotFound { index: i64, available: usize },
}

/// Split lyric text into its verses, in source order.
///
/// Empty text yields exactly one (empty) verse.
pub fn split_verses(text: &str) -> Vec<&str> {
    text.split(VERSE_SEPARATOR).collect()
}

/// Select the verse at 1-based `index` from `text`.
pub fn select_verse(text: &str, index: i64) -> Result<&str, VerseError> {
    if index <= 0 {
        return Err(VerseError::InvalidIndex(index));
    }

    let verses = split_verses(text);
    let available = verses.len();

    usize::try_from(index - 1)
        .ok()
        .and_then(|i| verses.get(i).copied())
        .ok_or(VerseError::NotFound { index, available })
}
