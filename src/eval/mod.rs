//! Accuracy scoring of stored responses against reviewed gold spans.
//!
//! A thin consumer of the aligner: predictions are regenerated by
//! replaying each stored response through alignment, gold spans are
//! snapped onto the same token grid, and the two sets are compared by
//! exact span + label match.

use std::collections::{BTreeMap, HashSet};

use crate::core::align::{align_response, snap_span};
use crate::core::tokenize::Tokenizer;
use crate::domain::{Label, LabelSet, ReviewedItem};

/// Precision / recall / F1 for one span-set comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrfScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counts {
    tp: usize,
    fp: usize,
    missed: usize,
}

impl Counts {
    fn score(&self) -> PrfScore {
        let precision = ratio(self.tp, self.tp + self.fp);
        let recall = ratio(self.tp, self.tp + self.missed);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        PrfScore {
            precision,
            recall,
            f1,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Aggregate and per-label scores for a dataset.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub overall: PrfScore,
    pub per_label: BTreeMap<String, PrfScore>,
}

/// Score stored model responses against reviewed gold annotations.
///
/// Items without text or without a stored response are skipped. Gold
/// spans outside the label set, or that no longer snap onto the token
/// grid, are dropped the same way predictions are - both sides go
/// through identical alignment before comparison.
pub fn evaluate<T: Tokenizer>(
    items: &[ReviewedItem],
    labels: &LabelSet,
    tokenizer: &T,
) -> Evaluation {
    let mut per_label: BTreeMap<Label, Counts> = BTreeMap::new();
    for label in labels.iter() {
        per_label.insert(label.clone(), Counts::default());
    }

    for item in items {
        let text = match &item.text {
            Some(text) => text,
            None => continue,
        };
        let llm = match &item.llm {
            Some(llm) => llm,
            None => continue,
        };
        let tokens = tokenizer.tokenize(text);

        let predicted: HashSet<(Label, usize, usize)> =
            align_response(text, &tokens, &llm.response, labels)
                .into_iter()
                .map(|s| (s.label, s.start, s.end))
                .collect();

        let gold: HashSet<(Label, usize, usize)> = item
            .spans
            .iter()
            .filter(|s| labels.contains(&s.label))
            .filter_map(|s| snap_span(&tokens, s))
            .map(|s| (s.label, s.start, s.end))
            .collect();

        for key in &predicted {
            let counts = per_label.entry(key.0.clone()).or_default();
            if gold.contains(key) {
                counts.tp += 1;
            } else {
                counts.fp += 1;
            }
        }
        for key in &gold {
            if !predicted.contains(key) {
                per_label.entry(key.0.clone()).or_default().missed += 1;
            }
        }
    }

    let mut total = Counts::default();
    for counts in per_label.values() {
        total.tp += counts.tp;
        total.fp += counts.fp;
        total.missed += counts.missed;
    }

    Evaluation {
        overall: total.score(),
        per_label: per_label
            .into_iter()
            .map(|(label, counts)| (label.as_str().to_string(), counts.score()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenize::UnicodeTokenizer;
    use crate::domain::{LlmExchange, Span};
    use serde_json::Map;

    fn reviewed(text: &str, response: &str, gold: Vec<Span>) -> ReviewedItem {
        ReviewedItem {
            text: Some(text.to_string()),
            spans: gold,
            answer: None,
            flagged: false,
            llm: Some(LlmExchange {
                prompt: String::new(),
                response: response.to_string(),
            }),
            extra: Map::new(),
        }
    }

    fn gold_span(label: &str, start: usize, end: usize) -> Span {
        Span {
            label: Label::new(label),
            start,
            end,
            token_start: 0,
            token_end: 0,
        }
    }

    #[test]
    fn test_perfect_prediction_scores_one() {
        let items = vec![reviewed(
            "Barack Obama visited Paris.",
            "person: Barack Obama\nloc: Paris",
            vec![gold_span("person", 0, 12), gold_span("loc", 21, 26)],
        )];
        let labels = LabelSet::new(["person", "loc"]);
        let evaluation = evaluate(&items, &labels, &UnicodeTokenizer);

        assert_eq!(evaluation.overall.precision, 1.0);
        assert_eq!(evaluation.overall.recall, 1.0);
        assert_eq!(evaluation.overall.f1, 1.0);
        assert_eq!(evaluation.per_label["person"].f1, 1.0);
    }

    #[test]
    fn test_false_positive_and_missed_gold() {
        // Model predicts Paris as person (wrong label) and misses the gold one
        let items = vec![reviewed(
            "Barack Obama visited Paris.",
            "person: Paris",
            vec![gold_span("loc", 21, 26)],
        )];
        let labels = LabelSet::new(["person", "loc"]);
        let evaluation = evaluate(&items, &labels, &UnicodeTokenizer);

        assert_eq!(evaluation.overall.precision, 0.0);
        assert_eq!(evaluation.overall.recall, 0.0);
        assert_eq!(evaluation.per_label["person"].precision, 0.0);
        assert_eq!(evaluation.per_label["loc"].recall, 0.0);
    }

    #[test]
    fn test_items_without_stored_response_are_skipped() {
        let mut item = reviewed("text", "", vec![]);
        item.llm = None;
        let labels = LabelSet::new(["person"]);
        let evaluation = evaluate(&[item], &labels, &UnicodeTokenizer);
        assert_eq!(evaluation.overall.f1, 0.0);
    }

    #[test]
    fn test_partial_match_scores_between() {
        let items = vec![reviewed(
            "Barack Obama visited Paris.",
            "person: Barack Obama",
            vec![gold_span("person", 0, 12), gold_span("loc", 21, 26)],
        )];
        let labels = LabelSet::new(["person", "loc"]);
        let evaluation = evaluate(&items, &labels, &UnicodeTokenizer);

        assert_eq!(evaluation.overall.precision, 1.0);
        assert_eq!(evaluation.overall.recall, 0.5);
    }
}
