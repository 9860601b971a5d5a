//! Completion API contract.
//!
//! The pipeline talks to the model through `CompletionClient`, a minimal
//! batched-completion interface: one request carries every prompt of a
//! batch and yields one completion per prompt, in order. The concrete
//! HTTP client lives in `openai`; tests substitute scripted in-process
//! clients.

pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

// Re-export the OpenAI client
pub use openai::OpenAiClient;

/// A batched completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompts: Vec<String>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Errors from the completion service.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Transient rejection; the caller should retry after a delay.
    #[error("Rate limited by the completion API (HTTP 429)")]
    RateLimited,

    #[error(
        "The completion API rejected the credentials: {0}. \
         Check your API key and organization in your account settings."
    )]
    Unauthorized(String),

    #[error("Completion API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error talking to the completion API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Expected {expected} completions in the response, got {got}")]
    MissingCompletions { expected: usize, got: usize },
}

/// Batched completion endpoint.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete every prompt in the request, preserving order.
    async fn complete(&self, request: &CompletionRequest) -> Result<Vec<String>, LlmError>;
}

/// Retry a request while the service reports a rate limit.
///
/// The same request is reissued up to `retries` times with a fixed sleep
/// between attempts. When retries are exhausted the final rate-limited
/// error is returned unmodified so the caller decides it is fatal; every
/// other outcome passes straight through. The attempt counter is explicit
/// here so the bound and the delay stay independently testable.
pub async fn complete_with_retry<C>(
    client: &C,
    request: &CompletionRequest,
    retries: u32,
    delay: Duration,
) -> Result<Vec<String>, LlmError>
where
    C: CompletionClient + ?Sized,
{
    let mut attempts_left = retries;
    loop {
        match client.complete(request).await {
            Err(LlmError::RateLimited) if attempts_left > 0 => {
                attempts_left -= 1;
                tracing::warn!(
                    "Rate limited by the completion API, retrying in {:?} ({} attempts left)",
                    delay,
                    attempts_left
                );
                tokio::time::sleep(delay).await;
            }
            outcome => return outcome,
        }
    }
}
