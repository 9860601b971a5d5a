//! enspan - LLM-assisted named entity annotation
//!
//! Turns free-text completions from a large language model into
//! token-aligned entity spans usable by a human-in-the-loop review tool.
//!
//! # Architecture
//!
//! Input items flow through a single sequential pipeline:
//! - Prompts are rendered from a template over the text, the label set,
//!   and a bounded window of previously accepted examples
//! - Each batch of prompts goes to the model in one request, with a
//!   fixed-delay retry on rate limiting
//! - Responses are parsed leniently and every mention is aligned back
//!   onto exact token boundaries in the source text, with a
//!   longest-span-wins policy resolving conflicts
//! - Accepted reviews feed back into the few-shot window, steering later
//!   prompts
//!
//! # Modules
//!
//! - `adapters`: completion API contract and HTTP client
//! - `core`: locating, parsing, alignment, the window, the pipeline
//! - `domain`: data structures (PromptExample, Span, item records)
//! - `eval`: precision/recall/F1 scoring against reviewed annotations
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Fetch suggestions for a dataset
//! enspan fetch input.jsonl output.jsonl --labels person,org,location
//!
//! # Score stored responses against corrected annotations
//! enspan evaluate reviewed.jsonl --labels person,org,location
//!
//! # Verify API access
//! enspan check --model text-davinci-003
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod dataset;
pub mod domain;
pub mod eval;

// Re-export main types at crate root for convenience
pub use crate::adapters::{
    complete_with_retry, CompletionClient, CompletionRequest, LlmError, OpenAiClient,
};
pub use crate::core::{
    align_response, batches, find_substrings, parse_response, ExampleStore, PromptBuilder,
    RequestParams, Suggester, TokenSpan, Tokenizer, UnicodeTokenizer,
};
pub use crate::domain::{
    AnnotatedItem, Answer, Disposition, InputItem, Label, LabelSet, LlmExchange, PromptExample,
    ReviewedItem, Span,
};
pub use crate::eval::{evaluate, Evaluation, PrfScore};
