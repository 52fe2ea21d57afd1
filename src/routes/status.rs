//! Idempotent job-status polling.
//!
//! A pure registry read; clients poll this every few seconds until the job
//! reaches a terminal state, so it must never wait on background work.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::models::{AppState, JobStatusResponse};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/job-status/{job_id}", get(job_status))
        .with_state(state)
}

async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> AppResult<Json<JobStatusResponse>> {
    let job = state.jobs.get(job_id).await?;
    Ok(Json(job.into()))
}
