//! Token and sentence boundaries.
//!
//! The aligner consumes token boundaries as plain byte ranges; this module
//! defines the capability trait plus a default implementation built on
//! Unicode segmentation. The trait seam exists so a host can substitute
//! the boundaries of whatever tokenizer its review tool uses.

use unicode_segmentation::UnicodeSegmentation;

/// A token's byte range in the source text (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

/// Source of token and sentence boundaries.
pub trait Tokenizer: Send + Sync {
    /// Ordered, non-overlapping token ranges over the content of `text`.
    fn tokenize(&self, text: &str) -> Vec<TokenSpan>;

    /// Ordered sentence ranges covering the whole text.
    fn segment_sentences(&self, text: &str) -> Vec<(usize, usize)>;
}

/// Tokenizer based on Unicode word and sentence boundaries.
///
/// Whitespace-only segments are skipped, so the grid contains content
/// tokens (words, numbers, punctuation) only.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeTokenizer;

impl Tokenizer for UnicodeTokenizer {
    fn tokenize(&self, text: &str) -> Vec<TokenSpan> {
        text.split_word_bound_indices()
            .filter(|(_, segment)| !segment.trim().is_empty())
            .map(|(start, segment)| TokenSpan {
                start,
                end: start + segment.len(),
            })
            .collect()
    }

    fn segment_sentences(&self, text: &str) -> Vec<(usize, usize)> {
        text.split_sentence_bound_indices()
            .map(|(start, segment)| (start, start + segment.len()))
            .collect()
    }
}
