//! OpenAI-style completion API client.
//!
//! Sends one batched request per pipeline batch: the `prompt` field
//! carries the whole list, and the response holds one choice per prompt
//! in the same order. HTTP status codes map onto the error taxonomy in
//! the parent module; 429 is the only retryable one.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

use super::{CompletionClient, CompletionRequest, LlmError};
use crate::config::Credentials;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// HTTP client for a batched completions endpoint.
pub struct OpenAiClient {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

impl OpenAiClient {
    /// Create a client against the default API endpoint.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (self-hosted gateways).
    pub fn with_base_url(credentials: Credentials, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            credentials,
            base_url: base_url.into(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Startup healthcheck: verify API access and, when a model name is
    /// given, validate it against the service's model list. Returns the
    /// sorted list of available model names.
    pub async fn verify_access(&self, model: Option<&str>) -> Result<Vec<String>> {
        let response = self
            .http
            .get(self.api_url("models"))
            .bearer_auth(&self.credentials.api_key)
            .header("OpenAI-Organization", self.credentials.api_org.as_str())
            .send()
            .await
            .context("Failed to reach the completion API")?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || status == StatusCode::UNPROCESSABLE_ENTITY
        {
            anyhow::bail!(
                "Could not access the completion API ({}). \
                 Check your API key and organization in your account settings.",
                status
            );
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Error accessing the completion API ({}): {}", status, body);
        }

        let list: ModelList = response
            .json()
            .await
            .context("Failed to parse the model list")?;
        let mut models: Vec<String> = list.data.into_iter().map(|m| m.id).collect();
        models.sort();
        models.dedup();

        if let Some(model) = model {
            if !models.iter().any(|m| m == model) {
                anyhow::bail!(
                    "The requested model '{}' is not available. Choices are: {}",
                    model,
                    models.join(", ")
                );
            }
        }

        Ok(models)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Vec<String>, LlmError> {
        let response = self
            .http
            .post(self.api_url("completions"))
            .bearer_auth(&self.credentials.api_key)
            .header("OpenAI-Organization", self.credentials.api_org.as_str())
            .json(&json!({
                "model": request.model,
                "prompt": request.prompts,
                "temperature": request.temperature,
                "max_tokens": request.max_tokens,
            }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Unauthorized(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        if parsed.choices.len() != request.prompts.len() {
            return Err(LlmError::MissingCompletions {
                expected: request.prompts.len(),
                got: parsed.choices.len(),
            });
        }

        Ok(parsed.choices.into_iter().map(|c| c.text).collect())
    }
}
