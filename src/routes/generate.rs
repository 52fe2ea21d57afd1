//! Submission endpoints for both generation job kinds.

use std::path::PathBuf;

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::jobs::dispatcher::PdfSubmission;
use crate::models::{AppState, GenerateExamRequest, JobSubmitResponse, PdfToCsvParams};
use crate::types::{AppError, AppResult};
use crate::utils::upload_filename;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-exam", post(generate_exam))
        .route("/pdf-to-csv", post(pdf_to_csv))
        .with_state(state)
}

async fn generate_exam(
    State(state): State<AppState>,
    Json(request): Json<GenerateExamRequest>,
) -> AppResult<(StatusCode, Json<JobSubmitResponse>)> {
    info!(
        exam_name = %request.exam_name,
        questions_per_subject = request.questions_per_subject,
        "Exam generation request received"
    );

    let job_id = state
        .dispatcher
        .submit_exam_generation(&request.exam_name, request.questions_per_subject)
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(JobSubmitResponse {
            job_id,
            message: format!(
                "Question generation for {} started; poll /job-status/{job_id}",
                request.exam_name.to_uppercase()
            ),
        }),
    ))
}

async fn pdf_to_csv(
    State(state): State<AppState>,
    Query(params): Query<PdfToCsvParams>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<JobSubmitResponse>)> {
    info!(exam_name = %params.exam_name, year = %params.year, "PDF extraction request received");

    let mut pdf: Option<(String, bytes::Bytes)> = None;
    let mut answer_key: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("failed to read upload: {e}")))?;

        match name.as_str() {
            "pdf_file" => pdf = Some((filename, data)),
            "answer_key_file" if !data.is_empty() => answer_key = Some((filename, data)),
            _ => {}
        }
    }

    let (pdf_name, pdf_data) = pdf.ok_or_else(|| {
        AppError::InvalidRequest("multipart field 'pdf_file' is required".to_string())
    })?;
    if pdf_data.is_empty() {
        return Err(AppError::InvalidRequest(
            "uploaded pdf_file is empty".to_string(),
        ));
    }

    let pdf_path = stage_upload(&state, &pdf_name, pdf_data).await?;
    let answer_key_path = match answer_key {
        Some((name, data)) => match stage_upload(&state, &name, data).await {
            Ok(path) => Some(path),
            Err(e) => {
                // Do not leak the already-staged PDF.
                let _ = tokio::fs::remove_file(&pdf_path).await;
                return Err(e);
            }
        },
        None => None,
    };

    let job_id = state
        .dispatcher
        .submit_pdf_extraction(PdfSubmission {
            exam_name: params.exam_name,
            year: params.year,
            subject: params.subject,
            pdf_path,
            answer_key_path,
        })
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(JobSubmitResponse {
            job_id,
            message: format!("PDF extraction started; poll /job-status/{job_id}"),
        }),
    ))
}

/// Write one upload into the staging directory under a derived name.
async fn stage_upload(
    state: &AppState,
    original_name: &str,
    data: bytes::Bytes,
) -> AppResult<PathBuf> {
    let dir = PathBuf::from(&state.config.storage.upload_dir);
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(upload_filename(original_name, "pdf"));
    tokio::fs::write(&path, &data).await?;
    Ok(path)
}
