//! Text transformation via the Anthropic Messages API.
//!
//! The client never fails outward: a broken call yields
//! [`Transformation::Fallback`], which still renders as a usable string.

mod client;
mod prompt;

use async_trait::async_trait;

pub use client::{AnthropicClient, AnthropicError};

/// In-character sentence substituted when the remote call fails.
pub const FALLBACK_TEXT: &str = "I tried to make this sound like Trump, but something went wrong. The API failed tremendously! Not good!";

/// Outcome of one transformation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformation {
    /// The remote service rewrote the text.
    Rewritten(String),

    /// The remote call failed and the fallback sentence stands in.
    Fallback,
}

impl Transformation {
    /// Collapses the outcome to the text that gets posted.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Rewritten(text) => text,
            Self::Fallback => FALLBACK_TEXT.to_owned(),
        }
    }
}

/// Something that rewrites text and always produces a string.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Rewrites `text`. Implementations absorb their own failures.
    async fn transform(&self, text: &str) -> String;
}
