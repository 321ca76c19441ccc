//! Command handling module.
//!
//! Validates slash command invocations and drives the
//! placeholder → transform → result message sequence.

mod handler;
mod types;

pub use handler::CommandHandler;
pub use types::{
    Acknowledgement, CommandInvocation, CommandOutcome, EMPTY_INPUT_TEXT, FAILURE_TEXT,
    LOADING_TEXT,
};
