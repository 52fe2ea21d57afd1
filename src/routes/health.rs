//! Liveness of this service and its generation dependency.

use std::time::Duration;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::models::{AppState, HealthResponse};

/// Ceiling on the dependency probe so health stays snappy even when the
/// generator hangs.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let generator_ok = matches!(
        tokio::time::timeout(PROBE_TIMEOUT, state.backend.health()).await,
        Ok(Ok(()))
    );

    let response = HealthResponse {
        status: if generator_ok { "ok" } else { "degraded" }.to_string(),
        generator: if generator_ok {
            "reachable"
        } else {
            "unreachable"
        }
        .to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    Json(response)
}
