//! Configuration module for the bot.
//!
//! Loads the required Slack and Anthropic credentials plus optional
//! server and presentation settings from the environment.

mod settings;

pub use settings::{BotSettings, ConfigError, Credentials};
