//! Command types and canned replies.

use serde::Deserialize;

/// Reply when the command carries no text.
pub const EMPTY_INPUT_TEXT: &str = "You didn't give me anything to trumpify. Sad! Try again with some text, it'll be tremendous. Many people say I give the best responses when you actually give me something to work with!";

/// Placeholder shown while the transformation runs.
pub const LOADING_TEXT: &str = "Making your message tremendous... believe me, it's gonna be the best transformation you've ever seen!";

/// Reply when posting the result (or the placeholder) failed.
pub const FAILURE_TEXT: &str = "There was a tremendous failure, believe me. The biggest! We had the best servers, but something went wrong. We're going to fix it and make it great again. Nobody has better error handling than me!";

/// One slash command invocation, as Slack posts it.
///
/// Slack sends more fields than these; only the ones the bot uses or logs
/// are kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandInvocation {
    /// The command name including the slash, e.g. `/trumpify`.
    pub command: String,

    /// Everything the user typed after the command.
    #[serde(default)]
    pub text: String,

    /// Channel the command was invoked in.
    pub channel_id: String,

    /// Thread the command was invoked in, if any.
    #[serde(default)]
    pub thread_ts: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub user_name: Option<String>,

    #[serde(default)]
    pub team_id: Option<String>,
}

impl CommandInvocation {
    /// Creates an invocation with only the fields the handler needs.
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        text: impl Into<String>,
        channel_id: impl Into<String>,
        thread_ts: Option<String>,
    ) -> Self {
        Self {
            command: command.into(),
            text: text.into(),
            channel_id: channel_id.into(),
            thread_ts,
            user_id: None,
            user_name: None,
            team_id: None,
        }
    }

    /// Parses an `application/x-www-form-urlencoded` slash command body.
    pub fn from_form(body: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        serde_urlencoded::from_bytes(body)
    }

    /// Returns `true` if there is nothing but whitespace to transform.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Synchronous reply to the webhook caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// Receipt confirmed; the work continues in the background.
    Accepted,

    /// The command is not one this bot answers.
    UnknownCommand(String),
}

impl Acknowledgement {
    /// Builds the reply for an unsupported command.
    #[must_use]
    pub fn unknown(supported: &str) -> Self {
        Self::UnknownCommand(format!(
            "Unknown command. The Trump Talk Bot only responds to {supported}."
        ))
    }
}

/// Terminal state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Unsupported command; nothing was posted.
    Rejected,

    /// No text supplied; a prompt-for-input message was posted.
    EmptyInput,

    /// The result was posted.
    Completed,

    /// A chat call failed; the canned failure message was attempted.
    Failed,
}

impl std::fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Rejected => "rejected",
            Self::EmptyInput => "empty_input",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
