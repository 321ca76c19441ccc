//! Trump Talk Bot Library
//!
//! A Slack slash command bot that rewrites messages in Donald Trump's
//! speaking style.
//!
//! This crate provides the core functionality for:
//! - Loading and validating credentials and settings
//! - Rewriting text via the Anthropic Messages API
//! - Posting and deleting Slack messages, and verifying signed requests
//! - Handling `/trumpify` invocations over HTTP

pub mod anthropic;
pub mod commands;
pub mod config;
pub mod server;
pub mod slack;

#[cfg(test)]
mod testing;
