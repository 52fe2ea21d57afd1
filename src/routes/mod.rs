//! API Routes
//!
//! HTTP surface of the generation service:
//! - `POST /generate-exam` - queue an AI question-set job
//! - `POST /pdf-to-csv` - queue a PDF extraction job
//! - `GET /job-status/{job_id}` - poll a job
//! - `GET /download/{filename}` - fetch a generated artifact
//! - `GET /generated-files` - list artifacts
//! - `GET /health` - service + generator liveness

pub mod files;
pub mod generate;
pub mod health;
pub mod status;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(generate::router(state.clone()))
        .merge(status::router(state.clone()))
        .merge(files::router(state.clone()))
        .merge(health::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
