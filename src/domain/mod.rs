//! Domain types for the annotation pipeline.
//!
//! This module contains the core data structures:
//! - Labels and spans: normalized labels, token-aligned ranges
//! - Examples: prompt examples, input items, annotated output
//! - Reviewed items: records coming back from the host review tool

pub mod example;
pub mod span;

// Re-export commonly used types
pub use example::{
    input_hash, task_hash, AnnotatedItem, Answer, Disposition, InputItem, LlmExchange,
    PromptExample, ReviewedItem,
};
pub use span::{Label, LabelSet, Span};
