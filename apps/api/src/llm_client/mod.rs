//! LLM Client — the single point of entry for all text-generation API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
//! All LLM interactions MUST go through this module.
//!
//! Callers depend on the `TextGenerator` trait, not the concrete client, so
//! the generation pipeline can be exercised with a stub and no live network.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for all LLM calls.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gpt-4o-mini";
/// Low randomness: evaluations against a fixed rubric should be repeatable.
const TEMPERATURE: f64 = 0.2;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A text-generation backend that returns a JSON object constrained to a
/// caller-supplied JSON Schema. Held in `AppState` as `Arc<dyn TextGenerator>`
/// so handlers and the pipeline can be tested against a stub.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_json(
        &self,
        system: &str,
        prompt: &str,
        schema_name: &str,
        schema: &Value,
    ) -> Result<Value, LlmError>;
}

/// OpenAI Chat Completions client. One call per request, no retries — a
/// failed generation is surfaced to the user rather than papered over.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate_json(
        &self,
        system: &str,
        prompt: &str,
        schema_name: &str,
        schema: &Value,
    ) -> Result<Value, LlmError> {
        let body = build_request_body(system, prompt, schema_name, schema);

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // Prefer the API's own error message when the body carries one
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or(text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: Value = response.json().await?;

        let (prompt_tokens, completion_tokens) = token_usage(&completion);
        debug!("LLM call succeeded: prompt_tokens={prompt_tokens}, completion_tokens={completion_tokens}");

        let content = completion
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or(LlmError::EmptyContent)?;

        let content = strip_json_fences(content);
        serde_json::from_str(content).map_err(LlmError::Parse)
    }
}

/// Builds the Chat Completions payload: fixed model, low temperature, and a
/// strict `json_schema` response format carrying the derived answer shape.
fn build_request_body(system: &str, prompt: &str, schema_name: &str, schema: &Value) -> Value {
    json!({
        "model": MODEL,
        "temperature": TEMPERATURE,
        "messages": [
            {"role": "system", "content": system},
            {"role": "user", "content": prompt}
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": schema_name,
                "strict": true,
                "schema": schema
            }
        }
    })
}

/// Pulls the token counts out of a completion's `usage` block, defaulting
/// to zero when the block is absent or malformed. Kept out of the logging
/// macro so `serde_json::Value` accessors never sit inside its expansion.
fn token_usage(completion: &Value) -> (u64, u64) {
    let read = |field: &str| {
        completion
            .pointer(&format!("/usage/{field}"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    };
    (read("prompt_tokens"), read("completion_tokens"))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
/// Strict schema mode should make this a no-op, but models occasionally
/// fence anyway and a fenced answer is still a usable answer.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
