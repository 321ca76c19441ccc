//! Command handler implementation.
//!
//! One invocation runs through a fixed sequence:
//! 1. Reject unsupported commands (nothing posted)
//! 2. Blank text → post a prompt-for-input message and stop
//! 3. Post the loading placeholder
//! 4. Transform the text
//! 5. Delete the placeholder (failure is logged and ignored)
//! 6. Post the result under the bot's display identity
//!
//! A failed post in step 3 or 6 ends in a best-effort failure message.
//! Nothing here returns an error to the caller.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::types::{
    Acknowledgement, CommandInvocation, CommandOutcome, EMPTY_INPUT_TEXT, FAILURE_TEXT,
    LOADING_TEXT,
};
use crate::anthropic::Transformer;
use crate::slack::{DisplayIdentity, MessageSink, PostMessage, SlackError};

/// Discards an error after logging it.
trait IgnoreAndLog {
    fn ignore_and_log(self, what: &str);
}

impl<T, E: Display> IgnoreAndLog for Result<T, E> {
    fn ignore_and_log(self, what: &str) {
        if let Err(e) = self {
            warn!("{}: {}", what, e);
        }
    }
}

/// Handles the slash command and drives the chat message sequence.
pub struct CommandHandler {
    /// Command name this handler answers (e.g. "`/trumpify`").
    command: String,

    /// Rewrites the user's text.
    transformer: Arc<dyn Transformer>,

    /// Posts and deletes chat messages.
    sink: Arc<dyn MessageSink>,

    /// Identity used for the final result message.
    identity: DisplayIdentity,
}

impl CommandHandler {
    /// Creates a new command handler.
    #[must_use]
    pub fn new(
        command: String,
        transformer: Arc<dyn Transformer>,
        sink: Arc<dyn MessageSink>,
        identity: DisplayIdentity,
    ) -> Self {
        Self {
            command,
            transformer,
            sink,
            identity,
        }
    }

    /// Decides the synchronous webhook reply. Does no I/O.
    #[must_use]
    pub fn acknowledge(&self, invocation: &CommandInvocation) -> Acknowledgement {
        if invocation.command == self.command {
            Acknowledgement::Accepted
        } else {
            Acknowledgement::unknown(&self.command)
        }
    }

    /// Runs an invocation to its terminal state.
    pub async fn process(&self, invocation: &CommandInvocation) -> CommandOutcome {
        if self.acknowledge(invocation) != Acknowledgement::Accepted {
            debug!("Ignoring unsupported command: {}", invocation.command);
            return CommandOutcome::Rejected;
        }

        if invocation.is_blank() {
            self.sink
                .post(&reply_to(invocation, EMPTY_INPUT_TEXT))
                .await
                .ignore_and_log("Could not send empty-input message");
            return CommandOutcome::EmptyInput;
        }

        let outcome = match self.transform_and_post(invocation).await {
            Ok(()) => CommandOutcome::Completed,
            Err(e) => {
                error!("Error processing slash command: {}", e);
                self.sink
                    .post(&reply_to(invocation, FAILURE_TEXT))
                    .await
                    .ignore_and_log("Error sending error message");
                CommandOutcome::Failed
            }
        };

        info!("Command {} finished: {}", invocation.command, outcome);
        outcome
    }

    async fn transform_and_post(&self, invocation: &CommandInvocation) -> Result<(), SlackError> {
        let started = Instant::now();

        let placeholder = self
            .sink
            .post(&reply_to(invocation, LOADING_TEXT))
            .await?;

        let rewritten = self.transformer.transform(&invocation.text).await;
        info!(
            "Trumpification completed in {:.2}s",
            started.elapsed().as_secs_f64()
        );

        self.sink
            .delete(&invocation.channel_id, &placeholder)
            .await
            .ignore_and_log("Could not delete loading message");

        let result = reply_to(invocation, rewritten).with_identity(self.identity.clone());
        self.sink.post(&result).await?;

        Ok(())
    }
}

/// A message to the invoking channel, in the invoking thread.
fn reply_to(invocation: &CommandInvocation, text: impl Into<String>) -> PostMessage {
    PostMessage::new(
        invocation.channel_id.clone(),
        text,
        invocation.thread_ts.clone(),
    )
}

impl std::fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandHandler")
            .field("command", &self.command)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
