//! Slack Web API client for posting and deleting chat messages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::MessageSink;
use crate::config::BotSettings;

/// Errors that can occur during Slack Web API calls.
#[derive(Debug, Error)]
pub enum SlackError {
    #[error("slack request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("slack http error: {0}")]
    Http(reqwest::StatusCode),

    #[error("slack api error: {0}")]
    Api(String),

    #[error("slack response missing message timestamp")]
    MissingTimestamp,
}

/// Identifier of a posted message (Slack's `ts`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Alternate username and icon for a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayIdentity {
    pub username: String,
    pub icon_url: String,
}

impl DisplayIdentity {
    /// Builds the identity configured in the bot settings.
    #[must_use]
    pub fn from_settings(settings: &BotSettings) -> Self {
        Self {
            username: settings.display_name.clone(),
            icon_url: settings.icon_url.clone(),
        }
    }
}

/// A chat message to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMessage {
    pub channel: String,
    pub text: String,
    pub thread_ts: Option<String>,
    pub identity: Option<DisplayIdentity>,
}

impl PostMessage {
    /// Creates a message with the bot's default identity.
    #[must_use]
    pub fn new(
        channel: impl Into<String>,
        text: impl Into<String>,
        thread_ts: Option<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            thread_ts,
            identity: None,
        }
    }

    /// Posts under an alternate identity.
    #[must_use]
    pub fn with_identity(mut self, identity: DisplayIdentity) -> Self {
        self.identity = Some(identity);
        self
    }
}

#[derive(Debug, Serialize)]
struct PostMessageBody<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    icon_url: Option<&'a str>,
}

impl<'a> From<&'a PostMessage> for PostMessageBody<'a> {
    fn from(message: &'a PostMessage) -> Self {
        Self {
            channel: &message.channel,
            text: &message.text,
            thread_ts: message.thread_ts.as_deref(),
            username: message.identity.as_ref().map(|i| i.username.as_str()),
            icon_url: message.identity.as_ref().map(|i| i.icon_url.as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    channel: &'a str,
    ts: &'a str,
}

/// Envelope every Slack Web API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    ts: Option<String>,
}

impl ApiResponse {
    fn into_result(self) -> Result<Self, SlackError> {
        if self.ok {
            Ok(self)
        } else {
            Err(SlackError::Api(
                self.error.unwrap_or_else(|| "unknown_error".to_owned()),
            ))
        }
    }
}

/// Slack Web API client authenticated with a bot token.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl SlackClient {
    /// Creates a client for the given bot token and API base URL.
    #[must_use]
    pub fn new(token: String, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    async fn call<B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<ApiResponse, SlackError> {
        let url = format!("{}/{method}", self.base_url);
        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(SlackError::Http(res.status()));
        }

        let data: ApiResponse = res.json().await?;
        data.into_result()
    }
}

#[async_trait]
impl MessageSink for SlackClient {
    async fn post(&self, message: &PostMessage) -> Result<MessageId, SlackError> {
        debug!(
            "chat.postMessage to {} (thread: {:?})",
            message.channel, message.thread_ts
        );
        let response = self
            .call("chat.postMessage", &PostMessageBody::from(message))
            .await?;
        response.ts.map(MessageId).ok_or(SlackError::MissingTimestamp)
    }

    async fn delete(&self, channel: &str, id: &MessageId) -> Result<(), SlackError> {
        debug!("chat.delete {} in {}", id, channel);
        self.call("chat.delete", &DeleteBody { channel, ts: &id.0 })
            .await
            .map(|_| ())
    }
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::testing::StubServer;

    #[test]
    fn test_post_body_omits_absent_fields() {
        let message = PostMessage::new("C1", "hello", None);
        let json = serde_json::to_value(PostMessageBody::from(&message)).unwrap();
        assert_eq!(json, serde_json::json!({"channel": "C1", "text": "hello"}));
    }

    #[test]
    fn test_post_body_with_identity_and_thread() {
        let message = PostMessage::new("C1", "huge", Some("123.456".to_owned())).with_identity(
            DisplayIdentity {
                username: "Trump Talk".to_owned(),
                icon_url: "https://example.test/icon.png".to_owned(),
            },
        );
        let json = serde_json::to_value(PostMessageBody::from(&message)).unwrap();
        assert_eq!(json["thread_ts"], "123.456");
        assert_eq!(json["username"], "Trump Talk");
        assert_eq!(json["icon_url"], "https://example.test/icon.png");
    }

    #[test]
    fn test_api_response_not_ok() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"ok":false,"error":"channel_not_found"}"#).unwrap();
        let err = response.into_result().unwrap_err();
        assert!(matches!(err, SlackError::Api(ref e) if e == "channel_not_found"));
    }

    #[test]
    fn test_api_response_ok_with_ts() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"ok":true,"channel":"C1","ts":"1700000000.000100"}"#)
                .unwrap();
        let response = response.into_result().unwrap();
        assert_eq!(response.ts.as_deref(), Some("1700000000.000100"));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_error() {
        let client = SlackClient::new("xoxb-test".to_owned(), "http://127.0.0.1:1/");
        let result = client.post(&PostMessage::new("C1", "hi", None)).await;
        assert!(matches!(result, Err(SlackError::Request(_))));
    }

    #[tokio::test]
    async fn test_post_request_shape() {
        let stub = StubServer::start(
            StatusCode::OK,
            r#"{"ok":true,"channel":"C1","ts":"1700000000.000100"}"#,
        )
        .await;
        let client = SlackClient::new("xoxb-test".to_owned(), &stub.base_url);
        let message = PostMessage::new("C1", "Tremendous.", Some("1699999999.000001".to_owned()))
            .with_identity(DisplayIdentity {
                username: "Trump Talk".to_owned(),
                icon_url: "https://example.test/icon.png".to_owned(),
            });

        let id = client.post(&message).await.unwrap();
        assert_eq!(id, MessageId("1700000000.000100".to_owned()));

        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.path, "/chat.postMessage");
        assert_eq!(request.header("authorization"), Some("Bearer xoxb-test"));

        let body = request.json();
        assert_eq!(body["channel"], "C1");
        assert_eq!(body["text"], "Tremendous.");
        assert_eq!(body["thread_ts"], "1699999999.000001");
        assert_eq!(body["username"], "Trump Talk");
        assert_eq!(body["icon_url"], "https://example.test/icon.png");
    }

    #[tokio::test]
    async fn test_error_status_is_http_error() {
        let stub = StubServer::start(StatusCode::SERVICE_UNAVAILABLE, "{}").await;
        let client = SlackClient::new("xoxb-test".to_owned(), &stub.base_url);

        let result = client.post(&PostMessage::new("C1", "hi", None)).await;
        assert!(matches!(
            result,
            Err(SlackError::Http(status)) if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn test_post_without_ts_is_error() {
        let stub = StubServer::start(StatusCode::OK, r#"{"ok":true}"#).await;
        let client = SlackClient::new("xoxb-test".to_owned(), &stub.base_url);

        let result = client.post(&PostMessage::new("C1", "hi", None)).await;
        assert!(matches!(result, Err(SlackError::MissingTimestamp)));
    }

    #[tokio::test]
    async fn test_delete_not_ok_is_api_error() {
        let stub =
            StubServer::start(StatusCode::OK, r#"{"ok":false,"error":"message_not_found"}"#).await;
        let client = SlackClient::new("xoxb-test".to_owned(), &stub.base_url);

        let result = client
            .delete("C1", &MessageId("1700000000.000100".to_owned()))
            .await;
        assert!(matches!(result, Err(SlackError::Api(ref e)) if e == "message_not_found"));

        let requests = stub.requests();
        assert_eq!(requests[0].path, "/chat.delete");
        assert_eq!(
            requests[0].json(),
            serde_json::json!({"channel": "C1", "ts": "1700000000.000100"})
        );
    }
}
