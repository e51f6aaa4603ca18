//! OpenAI-compatible chat completions adapter.
//!
//! Sends `POST {base_url}/chat/completions` with a system and a user message
//! and returns the first choice's message content verbatim.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use tracing::debug;

use super::error::GeneratorError;
use super::trait_def::Generator;
use super::types::GenerationRequest;
use crate::config::GeneratorConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of response body bytes echoed into an error message.
const ERROR_BODY_LIMIT: usize = 512;

/// Generator backed by an OpenAI-compatible HTTP API.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OpenAiGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn headers(&self) -> Result<HeaderMap, GeneratorError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| GeneratorError::Transport(format!("invalid API key header: {e}")))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

fn build_payload(request: &GenerationRequest) -> Value {
    json!({
        "model": request.params.model,
        "temperature": request.params.temperature,
        "max_tokens": request.params.max_tokens,
        "messages": [
            { "role": "system", "content": request.system },
            { "role": "user", "content": request.user },
        ],
    })
}

/// Pull the first choice's message content out of a completions body.
///
/// Missing, null and whitespace-only content are all
/// [`GeneratorError::EmptyResponse`], so a blank completion surfaces as a
/// generation failure and never reaches the extraction pipeline as a
/// malformed payload.
fn parse_content(body: &Value) -> Result<String, GeneratorError> {
    let content = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .ok_or(GeneratorError::EmptyResponse)?;

    if content.trim().is_empty() {
        return Err(GeneratorError::EmptyResponse);
    }
    Ok(content.to_string())
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        debug!(model = %request.params.model, "sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .headers(self.headers()?)
            .json(&build_payload(request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body: truncate(&text),
            });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;
        parse_content(&body)
    }
}
