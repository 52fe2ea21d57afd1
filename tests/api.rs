//! End-to-end tests over the assembled router: submission, polling,
//! artifact download, and the error surface.

mod common;

use axum::http::StatusCode;
use common::{
    body_bytes, body_json, build_test_app, get, poll_until_terminal, post_json, post_pdf,
    StubBackend,
};
use serde_json::json;

#[tokio::test]
async fn test_health_reports_generator_reachable() {
    let app = build_test_app(StubBackend::healthy());
    let response = get(&app.router, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["generator"], "reachable");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_generate_exam_happy_path_roundtrip() {
    let app = build_test_app(StubBackend::healthy());

    let response = post_json(
        &app.router,
        "/generate-exam",
        json!({ "exam_name": "JEE", "questions_per_subject": 40 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let submitted = body_json(response).await;
    let job_id = submitted["job_id"].as_str().expect("job_id missing").to_string();
    assert!(submitted["message"].as_str().unwrap().contains(&job_id));

    let status = poll_until_terminal(&app.router, &job_id).await;
    assert_eq!(status["status"], "completed");
    assert_eq!(status["progress"], 100);
    assert_eq!(status["result"]["total_questions"], 120);
    assert!(status.get("error").is_none());

    let files = status["result"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    let filename = files[0].as_str().unwrap();
    assert!(filename.ends_with(".csv"));

    // The listing shows the artifact with its real size.
    let listing = body_json(get(&app.router, "/generated-files").await).await;
    let entry = listing["files"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["filename"] == filename)
        .expect("artifact missing from listing");
    let listed_size = entry["size"].as_u64().unwrap();

    // And the download streams exactly that many bytes, as an attachment.
    let response = get(&app.router, &format!("/download/{filename}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(filename));
    let bytes = body_bytes(response).await;
    assert_eq!(bytes.len() as u64, listed_size);
    // 120 question rows plus the header.
    assert_eq!(bytes.split(|b| *b == b'\n').filter(|l| !l.is_empty()).count(), 121);
}

#[tokio::test]
async fn test_invalid_exam_rejected_without_creating_job() {
    let app = build_test_app(StubBackend::healthy());

    let response = post_json(
        &app.router,
        "/generate-exam",
        json!({ "exam_name": "INVALID", "questions_per_subject": 40 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("INVALID"));
    assert_eq!(app.state.jobs.len().await, 0);
}

#[tokio::test]
async fn test_out_of_range_count_rejected() {
    let app = build_test_app(StubBackend::healthy());

    let response = post_json(
        &app.router,
        "/generate-exam",
        json!({ "exam_name": "JEE", "questions_per_subject": 500 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.state.jobs.len().await, 0);
}

#[tokio::test]
async fn test_unknown_job_status_is_404() {
    let app = build_test_app(StubBackend::healthy());

    let response = get(
        &app.router,
        "/job-status/00000000-0000-4000-8000-000000000000",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A malformed ID never reaches the registry.
    let response = get(&app.router, "/job-status/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_unknown_artifact_is_404() {
    let app = build_test_app(StubBackend::healthy());

    let response = get(&app.router, "/download/missing.csv").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pdf_upload_missing_file_is_rejected() {
    let app = build_test_app(StubBackend::healthy());

    let response = post_pdf(
        &app.router,
        "/pdf-to-csv?exam_name=JEE&year=2023&subject=Physics",
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("pdf_file"));
    assert_eq!(app.state.jobs.len().await, 0);
}

#[tokio::test]
async fn test_pdf_extraction_success_yields_two_artifacts() {
    let app = build_test_app(StubBackend::healthy());

    let response = post_pdf(
        &app.router,
        "/pdf-to-csv?exam_name=JEE&year=2023&subject=Physics",
        Some(b"%PDF-1.4 uploaded paper"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let job_id = body_json(response).await["job_id"]
        .as_str()
        .unwrap()
        .to_string();

    let status = poll_until_terminal(&app.router, &job_id).await;
    assert_eq!(status["status"], "completed");
    let files = status["result"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
}

#[tokio::test]
async fn test_pdf_extraction_failure_reports_external_service_error() {
    let app = build_test_app(StubBackend {
        fail_extraction: Some("unparseable PDF"),
    });

    let response = post_pdf(
        &app.router,
        "/pdf-to-csv?exam_name=JEE&year=2023&subject=Physics",
        Some(b"%PDF-1.4 uploaded paper"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let job_id = body_json(response).await["job_id"]
        .as_str()
        .unwrap()
        .to_string();

    let status = poll_until_terminal(&app.router, &job_id).await;
    assert_eq!(status["status"], "failed");
    assert_eq!(status["error"]["kind"], "external_service");
    assert!(status["error"]["message"]
        .as_str()
        .unwrap()
        .contains("unparseable PDF"));
    assert!(status.get("result").is_none());

    // The failed job produced no artifacts.
    let listing = body_json(get(&app.router, "/generated-files").await).await;
    assert!(listing["files"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_terminal_status_is_stable_across_polls() {
    let app = build_test_app(StubBackend::healthy());

    let response = post_json(
        &app.router,
        "/generate-exam",
        json!({ "exam_name": "NEET", "questions_per_subject": 10 }),
    )
    .await;
    let job_id = body_json(response).await["job_id"]
        .as_str()
        .unwrap()
        .to_string();

    let first = poll_until_terminal(&app.router, &job_id).await;
    for _ in 0..5 {
        let again = body_json(get(&app.router, &format!("/job-status/{job_id}")).await).await;
        assert_eq!(again, first);
    }
}
