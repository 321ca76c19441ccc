//! Test doubles shared across modules.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, Uri};
use tokio::net::TcpListener;

use crate::anthropic::Transformer;
use crate::slack::{MessageId, MessageSink, PostMessage, SlackError};

/// One call made against a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    /// `id` is `None` when the post was made to fail.
    Post {
        message: PostMessage,
        id: Option<MessageId>,
    },
    Delete {
        channel: String,
        id: MessageId,
    },
}

/// Messaging sink that records every call and fails on request.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    failing_posts: HashSet<usize>,
    fail_delete: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`th post (zero-based) fail.
    pub fn failing_post(mut self, n: usize) -> Self {
        self.failing_posts.insert(n);
        self
    }

    /// Makes every delete fail.
    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Every attempted post, in order.
    pub fn posts(&self) -> Vec<PostMessage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SinkCall::Post { message, .. } => Some(message),
                SinkCall::Delete { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn post(&self, message: &PostMessage) -> Result<MessageId, SlackError> {
        let mut calls = self.calls.lock().unwrap();
        let n = calls
            .iter()
            .filter(|c| matches!(c, SinkCall::Post { .. }))
            .count();

        if self.failing_posts.contains(&n) {
            calls.push(SinkCall::Post {
                message: message.clone(),
                id: None,
            });
            return Err(SlackError::Api("channel_not_found".to_owned()));
        }

        let id = MessageId(format!("1700000000.{n:06}"));
        calls.push(SinkCall::Post {
            message: message.clone(),
            id: Some(id.clone()),
        });
        Ok(id)
    }

    async fn delete(&self, channel: &str, id: &MessageId) -> Result<(), SlackError> {
        self.calls.lock().unwrap().push(SinkCall::Delete {
            channel: channel.to_owned(),
            id: id.clone(),
        });
        if self.fail_delete {
            return Err(SlackError::Api("cant_delete_message".to_owned()));
        }
        Ok(())
    }
}

/// Transformer returning a fixed string and remembering its inputs.
#[derive(Debug)]
pub struct FakeTransformer {
    output: String,
    delay: Duration,
    inputs: Mutex<Vec<String>>,
}

impl FakeTransformer {
    pub fn returning(output: &str) -> Self {
        Self {
            output: output.to_owned(),
            delay: Duration::ZERO,
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Sleeps for `delay` before answering.
    pub fn slow(output: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::returning(output)
        }
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transformer for FakeTransformer {
    async fn transform(&self, text: &str) -> String {
        self.inputs.lock().unwrap().push(text.to_owned());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.output.clone()
    }
}

/// A request received by a [`StubServer`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Local HTTP server answering every request with one canned response.
#[derive(Debug)]
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl StubServer {
    pub async fn start(status: StatusCode, response: &'static str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&requests);

        let app = Router::new().fallback(move |uri: Uri, headers: HeaderMap, body: Bytes| {
            let captured = Arc::clone(&captured);
            async move {
                captured.lock().unwrap().push(CapturedRequest {
                    path: uri.path().to_owned(),
                    headers,
                    body,
                });
                (status, [("content-type", "application/json")], response)
            }
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}
