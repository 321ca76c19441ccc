//! Slack integration.
//!
//! Provides the chat messaging sink used by the command handler and
//! verification of signed inbound requests.

mod client;
mod signature;

use async_trait::async_trait;

pub use client::{DisplayIdentity, MessageId, PostMessage, SlackClient, SlackError};
pub use signature::{SIGNATURE_HEADER, SignatureError, SignatureVerifier, TIMESTAMP_HEADER};

/// Where chat messages go.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Posts a message and returns its identifier.
    async fn post(&self, message: &PostMessage) -> Result<MessageId, SlackError>;

    /// Deletes a previously posted message.
    async fn delete(&self, channel: &str, id: &MessageId) -> Result<(), SlackError>;
}
