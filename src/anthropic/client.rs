//! Anthropic Messages API client used for the text transformation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use super::prompt::build_prompt;
use super::{Transformation, Transformer};
use crate::config::BotSettings;

const API_VERSION: &str = "2023-06-01";

/// Errors from a single Messages API call.
///
/// These never leave the client: [`AnthropicClient::transform`] turns every
/// one of them into [`Transformation::Fallback`].
#[derive(Debug, Error)]
pub enum AnthropicError {
    #[error("anthropic request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("anthropic api error: {status} {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("anthropic response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Client for the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Creates a client from the API key and bot settings.
    #[must_use]
    pub fn new(api_key: String, settings: &BotSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            endpoint: format!(
                "{}/v1/messages",
                settings.anthropic_base_url.trim_end_matches('/')
            ),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        }
    }

    /// Rewrites `text`, substituting the fallback sentence on any failure.
    pub async fn transformation(&self, text: &str) -> Transformation {
        match self.request(text).await {
            Ok(rewritten) => Transformation::Rewritten(rewritten),
            Err(e) => {
                error!("Error calling Anthropic API: {}", e);
                Transformation::Fallback
            }
        }
    }

    /// POST /v1/messages with the fixed prompt around `text`.
    async fn request(&self, text: &str) -> Result<String, AnthropicError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: build_prompt(text),
            }],
        };

        debug!("Sending transformation request (model: {})", self.model);

        let res = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AnthropicError::Api { status, body });
        }

        let data: MessagesResponse = res.json().await?;
        let text = extract_text(&data);
        if text.is_empty() {
            return Err(AnthropicError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl Transformer for AnthropicClient {
    async fn transform(&self, text: &str) -> String {
        self.transformation(text).await.into_text()
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

/// Space-joins the `text` blocks of a response and trims the result.
fn extract_text(response: &MessagesResponse) -> String {
    response
        .content
        .iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_owned()
}
