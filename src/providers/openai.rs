//! OpenAI-compatible chat-completions client.
//!
//! Talks to any endpoint exposing `POST {base_url}/chat/completions` with
//! the OpenAI request/response shape (OpenAI itself, OpenRouter, proxies
//! fronting Anthropic models, local servers).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::traits::ChatProvider;
use crate::types::{ChatOptions, ChatResponse, FinishReason, Message, Usage};
use crate::{Result, SkaldError};

/// Default base URL for the OpenAI API.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Client for OpenAI-compatible chat-completions endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: String,
    http: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl OpenAiClient {
    /// Create a client for the default OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (proxies, wiremock).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_http_client(api_key, base_url, Client::new())
    }

    /// Create a client sharing an existing HTTP connection pool.
    pub fn with_http_client(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        http: Client,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    /// Set a per-request timeout. Without one, reqwest's default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Map a non-success response to an error, reading the body for the
    /// provider's own message.
    async fn error_from_response(response: reqwest::Response) -> SkaldError {
        let status = response.status();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });

        match status.as_u16() {
            401 => SkaldError::AuthenticationFailed(message),
            429 => SkaldError::RateLimited { retry_after },
            code => SkaldError::Api {
                status: code,
                message,
            },
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(name = "openai.chat", skip_all, fields(model = %options.model))]
    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut request = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model: &options.model,
                messages,
                temperature: options.temperature,
                max_tokens: options.max_tokens,
            });
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let completion: CompletionResponse = response.json().await?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or(SkaldError::EmptyResponse)?;
        let content = choice
            .message
            .content
            .filter(|c| !c.is_empty())
            .ok_or(SkaldError::EmptyResponse)?;

        Ok(ChatResponse {
            content,
            usage: completion.usage,
            model: completion.model,
            finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
