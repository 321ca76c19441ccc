//! HTTP server exposing the Slack webhooks and a health endpoint.

mod routes;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::commands::{CommandHandler, CommandOutcome};
use crate::slack::{SignatureError, SignatureVerifier};

/// Command runs that outlive the webhook request that started them.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    runs: Arc<Mutex<JoinSet<CommandOutcome>>>,
}

impl InFlight {
    /// Starts `run` in the background and keeps track of it.
    pub async fn spawn<F>(&self, run: F)
    where
        F: Future<Output = CommandOutcome> + Send + 'static,
    {
        let mut runs = self.runs.lock().await;
        // Reap finished runs so the set only holds live ones.
        while runs.try_join_next().is_some() {}
        runs.spawn(run);
    }

    /// Waits for every tracked run to reach its terminal state.
    ///
    /// Returns the number of runs waited on.
    pub async fn drain(&self) -> usize {
        let mut runs = self.runs.lock().await;
        let mut drained = 0;
        while let Some(result) = runs.join_next().await {
            drained += 1;
            if let Err(e) = result {
                warn!("Command run ended abnormally: {}", e);
            }
        }
        drained
    }
}

/// State shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    handler: Arc<CommandHandler>,
    verifier: SignatureVerifier,
    in_flight: InFlight,
}

impl AppState {
    #[must_use]
    pub fn new(handler: Arc<CommandHandler>, verifier: SignatureVerifier) -> Self {
        Self {
            handler,
            verifier,
            in_flight: InFlight::default(),
        }
    }

    /// Runs started by accepted slash commands.
    #[must_use]
    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), SignatureError> {
        self.verifier
            .verify_headers(headers, body, Utc::now().timestamp())
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/slack/commands", post(routes::slash_command))
        .route("/slack/events", post(routes::slack_event))
        .with_state(state)
}

/// Serves the router on `listener` until `shutdown` completes, then waits
/// for command runs that were already acknowledged.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!("Trump Talk Bot server is running on {}", addr);
        info!("Health check available at http://{}/health", addr);
    }

    let in_flight = state.in_flight.clone();
    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await;

    let drained = in_flight.drain().await;
    if drained > 0 {
        info!("Finished {} in-flight command run(s)", drained);
    }
    served
}
