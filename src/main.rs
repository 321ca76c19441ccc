//! Trump Talk Bot - Main Entry Point
//!
//! Serves the `/trumpify` Slack slash command, rewriting the supplied text
//! in Donald Trump's speaking style.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use trump_talk_bot::anthropic::{AnthropicClient, Transformer};
use trump_talk_bot::commands::CommandHandler;
use trump_talk_bot::config::{BotSettings, Credentials};
use trump_talk_bot::server::{self, AppState};
use trump_talk_bot::slack::{DisplayIdentity, MessageSink, SignatureVerifier, SlackClient};

/// Slack bot that makes your messages sound tremendous.
#[derive(Parser, Debug)]
#[command(name = "trump_talk_bot")]
#[command(about = "Serve the /trumpify Slack slash command")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Port to listen on (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Fail before serving anything if a secret is missing
    let credentials = Credentials::from_env()
        .context("Missing required environment variables. Please check your .env file")?;

    let mut settings = BotSettings::from_env_with_defaults();
    if let Some(port) = args.port {
        settings.port = port;
    }

    info!(
        "Answering {} with model {} (max_tokens: {})",
        settings.command, settings.model, settings.max_tokens
    );

    let transformer: Arc<dyn Transformer> = Arc::new(AnthropicClient::new(
        credentials.anthropic_api_key.clone(),
        &settings,
    ));
    let sink: Arc<dyn MessageSink> = Arc::new(SlackClient::new(
        credentials.bot_token.clone(),
        &settings.slack_base_url,
    ));

    let handler = Arc::new(CommandHandler::new(
        settings.command.clone(),
        transformer,
        sink,
        DisplayIdentity::from_settings(&settings),
    ));
    let state = AppState::new(handler, SignatureVerifier::new(credentials.signing_secret));

    let addr = settings.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    server::serve(listener, state, shutdown_signal())
        .await
        .context("Server exited with an error")?;

    info!("Shutting down...");
    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Completes on Ctrl+C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down..."),
        Err(e) => {
            warn!("Could not listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
