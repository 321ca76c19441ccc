//! HTTP route handlers.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::AppState;
use crate::commands::{Acknowledgement, CommandInvocation};

/// Envelope of a Slack Events API request.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum EventEnvelope {
    UrlVerification { challenge: String },
    EventCallback { event: Value },
    #[serde(other)]
    Other,
}

/// GET /health returns static status information (for probes).
pub(super) async fn health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "message": "Trump Talk Bot is running tremendously well, believe me!",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// POST /slack/commands acknowledges at once and works in the background.
pub(super) async fn slash_command(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = state.verify(&headers, &body) {
        warn!("Rejected slash command request: {}", e);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let invocation = match CommandInvocation::from_form(&body) {
        Ok(invocation) => invocation,
        Err(e) => {
            warn!("Malformed slash command payload: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    info!("Received slash command: {}", invocation.command);

    match state.handler.acknowledge(&invocation) {
        Acknowledgement::Accepted => {
            let handler = Arc::clone(&state.handler);
            state
                .in_flight
                .spawn(async move { handler.process(&invocation).await })
                .await;
            StatusCode::OK.into_response()
        }
        Acknowledgement::UnknownCommand(text) => (StatusCode::OK, text).into_response(),
    }
}

/// POST /slack/events answers URL verification and logs mentions.
pub(super) async fn slack_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = state.verify(&headers, &body) {
        warn!("Rejected event request: {}", e);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let envelope: EventEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!("Malformed event payload: {}", e);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match envelope {
        EventEnvelope::UrlVerification { challenge } => {
            Json(json!({ "challenge": challenge })).into_response()
        }
        EventEnvelope::EventCallback { event } => {
            let kind = event.get("type").and_then(Value::as_str).unwrap_or("unknown");
            if kind == "app_mention" {
                // Mentions are acknowledged but not answered yet.
                let channel = event.get("channel").and_then(Value::as_str).unwrap_or("?");
                info!("Bot was mentioned in {}", channel);
            } else {
                debug!("Ignoring event: {}", kind);
            }
            StatusCode::OK.into_response()
        }
        EventEnvelope::Other => StatusCode::OK.into_response(),
    }
}
