//! Pipeline item records and prompt examples.
//!
//! Items flow through the pipeline as JSON records. Fields the pipeline
//! does not understand are carried through untouched, so the host review
//! tool can round-trip its own metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use super::span::{LabelSet, Span};

/// A previously confirmed text + entities pair included in a prompt to
/// steer the model.
///
/// Immutable once created; updates build new instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptExample {
    pub text: String,
    /// Mention strings grouped by normalized label, in source order.
    pub entities: BTreeMap<String, Vec<String>>,
}

impl PromptExample {
    /// Build an example from an accepted review item.
    ///
    /// Only spans whose label is in the active set are retained; mention
    /// text is sliced from the item's own offsets. Returns `None` when the
    /// item carries no text. Offsets that do not land on valid boundaries
    /// of the text are skipped rather than trusted.
    pub fn from_review(item: &ReviewedItem, labels: &LabelSet) -> Option<Self> {
        let text = item.text.as_deref()?;
        let mut entities: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for span in &item.spans {
            if !labels.contains(&span.label) {
                continue;
            }
            if let Some(mention) = text.get(span.start..span.end) {
                entities
                    .entry(span.label.as_str().to_string())
                    .or_default()
                    .push(mention.to_string());
            }
        }
        Some(Self {
            text: text.to_string(),
            entities,
        })
    }
}

/// One unit of input to the suggestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputItem {
    pub text: String,

    /// Passthrough fields preserved on the annotated output.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InputItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extra: Map::new(),
        }
    }
}

/// Prompt/response pair recorded on every annotated item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmExchange {
    pub prompt: String,
    pub response: String,
}

/// The pipeline's output unit: the input item plus the model exchange and
/// the aligned spans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedItem {
    pub text: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    pub llm: LlmExchange,
    pub spans: Vec<Span>,

    /// Hash of the input text, for exclude-by-input dedup downstream.
    pub input_hash: String,
    /// Hash of the input text plus its spans.
    pub task_hash: String,
}

/// The reviewer's decision on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Accept,
    Reject,
    Ignore,
}

/// A record handed back by the host review tool after a human decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default)]
    pub spans: Vec<Span>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,

    /// Whether the reviewer flagged this item for prompt use.
    #[serde(default)]
    pub flagged: bool,

    /// The stored model exchange, present when the item came out of this
    /// pipeline. Evaluation replays alignment from `llm.response`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmExchange>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How a reviewed item participates in the feedback loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition<'a> {
    /// Flagged for prompt use, accepted, and carrying text: eligible for
    /// the few-shot window.
    PromptWorthy(&'a str),
    /// Everything else; never enters the window.
    Skip,
}

impl ReviewedItem {
    /// Classify this item for the feedback loop.
    pub fn disposition(&self) -> Disposition<'_> {
        match (&self.text, self.answer, self.flagged) {
            (Some(text), Some(Answer::Accept), true) => Disposition::PromptWorthy(text),
            _ => Disposition::Skip,
        }
    }
}

/// Deterministic hash of the input text (16 hex chars).
pub fn input_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

/// Deterministic hash of the input text plus its span annotations.
pub fn task_hash(text: &str, spans: &[Span]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    for span in spans {
        hasher.update(span.label.as_str().as_bytes());
        hasher.update(span.start.to_string().as_bytes());
        hasher.update(span.end.to_string().as_bytes());
    }
    hex::encode(&hasher.finalize()[..8])
}
