//! Labels and token-aligned spans.
//!
//! A `Span` is the unit the review tool consumes: a labeled byte range in
//! a specific text, snapped to whole-token boundaries. Spans are produced
//! by the aligner (or deserialized from records the host tool hands back);
//! nothing else constructs them ad hoc.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A normalized entity label.
///
/// Labels are case-folded once at construction, so two labels compare
/// equal exactly when their folded forms match. Deserialization folds as
/// well, which means labels arriving from files or the review tool never
/// bypass normalization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl<'de> Deserialize<'de> for Label {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Label::new(&raw))
    }
}

/// The active label set for a run, normalized once at configuration time.
///
/// Preserves the order labels were given in and drops duplicates (after
/// folding).
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<Label> = Vec::new();
        for item in raw {
            let label = Label::new(item.as_ref());
            if !label.as_str().is_empty() && !labels.contains(&label) {
                labels.push(label);
            }
        }
        Self { labels }
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A labeled, token-aligned range inside a specific text.
///
/// `start`/`end` are half-open byte offsets into the exact source text
/// (`start < end`); `token_start`/`token_end` are inclusive indices into
/// the token grid the span was aligned against. Because spans reference
/// offsets rather than copied strings, the source casing of the mention is
/// preserved by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub label: Label,
    pub start: usize,
    pub end: usize,
    pub token_start: usize,
    pub token_end: usize,
}

impl Span {
    /// Slice the mention text out of its source.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether two spans share at least one byte position.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_folds_on_construction() {
        assert_eq!(Label::new("PERSON"), Label::new("person"));
        assert_eq!(Label::new("  Loc "), Label::new("loc"));
        assert_eq!(Label::new("ORG").as_str(), "org");
    }

    #[test]
    fn test_label_folds_on_deserialize() {
        let label: Label = serde_json::from_str("\"PERSON\"").unwrap();
        assert_eq!(label, Label::new("person"));
    }

    #[test]
    fn test_label_set_dedups_preserving_order() {
        let set = LabelSet::new(["PERSON", "loc", "Person", "ORG"]);
        let labels: Vec<&str> = set.iter().map(|l| l.as_str()).collect();
        assert_eq!(labels, vec!["person", "loc", "org"]);
        assert!(set.contains(&Label::new("PERSON")));
        assert!(!set.contains(&Label::new("misc")));
    }

    #[test]
    fn test_span_overlap() {
        let a = Span {
            label: Label::new("a"),
            start: 0,
            end: 5,
            token_start: 0,
            token_end: 0,
        };
        let mut b = a.clone();
        b.start = 4;
        b.end = 9;
        assert!(a.overlaps(&b));
        b.start = 5;
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_span_text_slices_source_casing() {
        let span = Span {
            label: Label::new("person"),
            start: 0,
            end: 6,
            token_start: 0,
            token_end: 0,
        };
        assert_eq!(span.text("Barack Obama"), "Barack");
    }
}
