//! Credentials and runtime settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Secrets required to talk to Slack and Anthropic.
///
/// All three must be present and non-empty; the process refuses to serve
/// traffic otherwise.
#[derive(Clone)]
pub struct Credentials {
    /// Slack app signing secret, used to verify inbound requests.
    pub signing_secret: String,

    /// Slack bot token (`xoxb-...`) used for `chat.*` calls.
    pub bot_token: String,

    /// Anthropic API key.
    pub anthropic_api_key: String,
}

impl Credentials {
    /// Creates credentials from explicit values.
    #[must_use]
    pub fn new(signing_secret: String, bot_token: String, anthropic_api_key: String) -> Self {
        Self {
            signing_secret,
            bot_token,
            anthropic_api_key,
        }
    }

    /// Creates credentials from environment variables.
    ///
    /// Expects `SLACK_SIGNING_SECRET`, `SLACK_BOT_TOKEN` and
    /// `ANTHROPIC_API_KEY` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first variable that is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates credentials using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingEnvVar(key))
        };

        Ok(Self {
            signing_secret: require("SLACK_SIGNING_SECRET")?,
            bot_token: require("SLACK_BOT_TOKEN")?,
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

/// Bot-specific settings. Every field has a default.
#[derive(Debug, Clone)]
pub struct BotSettings {
    /// Address the HTTP server binds to.
    pub bind_address: IpAddr,

    /// Port the HTTP server listens on.
    pub port: u16,

    /// The slash command this bot answers.
    pub command: String,

    /// Anthropic model identifier.
    pub model: String,

    /// Token budget for one transformation.
    pub max_tokens: u32,

    /// Anthropic API base URL.
    pub anthropic_base_url: String,

    /// Slack Web API base URL.
    pub slack_base_url: String,

    /// Username shown on the final result message.
    pub display_name: String,

    /// Icon shown on the final result message.
    pub icon_url: String,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_command() -> String {
    "/trumpify".to_owned()
}

fn default_model() -> String {
    "claude-3-haiku-20240307".to_owned()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_owned()
}

fn default_slack_base_url() -> String {
    "https://slack.com/api".to_owned()
}

fn default_display_name() -> String {
    "Trump Talk".to_owned()
}

fn default_icon_url() -> String {
    "https://i.imgur.com/Ob7VNge.png".to_owned()
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            command: default_command(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            anthropic_base_url: default_anthropic_base_url(),
            slack_base_url: default_slack_base_url(),
            display_name: default_display_name(),
            icon_url: default_icon_url(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates bot settings from an arbitrary variable lookup.
    ///
    /// Unparseable numeric or address values fall back to their defaults.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&'static str) -> Option<String>,
    {
        Self {
            bind_address: lookup("BIND_ADDRESS")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_bind_address),
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_port),
            command: lookup("SLASH_COMMAND").unwrap_or_else(default_command),
            model: lookup("ANTHROPIC_MODEL").unwrap_or_else(default_model),
            max_tokens: lookup("ANTHROPIC_MAX_TOKENS")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_tokens),
            anthropic_base_url: lookup("ANTHROPIC_BASE_URL")
                .unwrap_or_else(default_anthropic_base_url),
            slack_base_url: lookup("SLACK_API_BASE_URL").unwrap_or_else(default_slack_base_url),
            display_name: lookup("BOT_DISPLAY_NAME").unwrap_or_else(default_display_name),
            icon_url: lookup("BOT_ICON_URL").unwrap_or_else(default_icon_url),
        }
    }

    /// Socket address the server should listen on.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
}
