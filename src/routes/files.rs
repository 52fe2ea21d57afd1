//! Artifact listing and download.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::models::{AppState, FileEntry, GeneratedFilesResponse};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generated-files", get(list_files))
        .route("/download/{filename}", get(download_file))
        .with_state(state)
}

async fn list_files(State(state): State<AppState>) -> AppResult<Json<GeneratedFilesResponse>> {
    let files = state
        .artifacts
        .list()
        .await?
        .into_iter()
        .map(|entry| FileEntry {
            filename: entry.filename,
            size: entry.size_bytes,
            created_at: entry.created_at,
        })
        .collect();
    Ok(Json(GeneratedFilesResponse { files }))
}

async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let download = state.artifacts.open(&filename).await?;
    info!(filename = %filename, size_bytes = download.size_bytes, "Artifact download");

    let stream = ReaderStream::new(download.file);
    Response::builder()
        .header(header::CONTENT_TYPE, download.content_type.as_ref())
        .header(header::CONTENT_LENGTH, download.size_bytes)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("failed to build download response: {e}")))
}
