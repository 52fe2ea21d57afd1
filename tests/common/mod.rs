//! Shared harness for HTTP-level tests: a scripted generation backend and
//! an app router wired against temporary directories.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use examforge::config::{Config, GeneratorConfig, RetentionConfig, ServerConfig, StorageConfig};
use examforge::exams::Exam;
use examforge::generation::{
    ExtractionOutput, ExtractionRequest, GeneratedQuestion, GenerationBackend, GenerationOutput,
};
use examforge::types::{AppError, AppResult};
use examforge::AppState;

/// Scripted stand-in for the external content-generation service.
pub struct StubBackend {
    /// When set, `extract_pdf` fails with this upstream message.
    pub fail_extraction: Option<&'static str>,
}

impl StubBackend {
    pub fn healthy() -> Self {
        Self {
            fail_extraction: None,
        }
    }

    fn questions(exam: Exam, per_subject: u32) -> Vec<GeneratedQuestion> {
        let mut questions = Vec::new();
        for subject in exam.subjects() {
            for i in 0..per_subject {
                questions.push(GeneratedQuestion {
                    subject: subject.to_string(),
                    text: format!("{subject} question {i}"),
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    answer: "A".into(),
                });
            }
        }
        questions
    }
}

#[async_trait]
impl GenerationBackend for StubBackend {
    async fn generate_exam(
        &self,
        exam: Exam,
        questions_per_subject: u32,
    ) -> AppResult<GenerationOutput> {
        Ok(GenerationOutput {
            questions: Self::questions(exam, questions_per_subject),
            warnings: vec![],
        })
    }

    async fn extract_pdf(&self, _request: &ExtractionRequest) -> AppResult<ExtractionOutput> {
        if let Some(reason) = self.fail_extraction {
            return Err(AppError::ExternalService(reason.to_string()));
        }
        Ok(ExtractionOutput {
            questions: Self::questions(Exam::Jee, 5),
            warnings: vec![],
            report: "Extracted 15 questions".into(),
        })
    }

    async fn health(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _dirs: (TempDir, TempDir),
}

/// Build the full application against temp dirs and the given backend,
/// mirroring the wiring in `main.rs`.
pub fn build_test_app(backend: StubBackend) -> TestApp {
    let artifact_dir = TempDir::new().unwrap();
    let upload_dir = TempDir::new().unwrap();

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        generator: GeneratorConfig {
            base_url: "http://localhost:0".to_string(),
            request_timeout_secs: 10,
        },
        storage: StorageConfig {
            artifact_dir: artifact_dir.path().to_string_lossy().into_owned(),
            upload_dir: upload_dir.path().to_string_lossy().into_owned(),
        },
        retention: RetentionConfig {
            job_ttl_secs: 3600,
            artifact_ttl_secs: 3600,
            sweep_interval_secs: 3600,
        },
    };

    let state = AppState::new(config, Arc::new(backend));
    let router = examforge::create_router(state.clone());
    TestApp {
        router,
        state,
        _dirs: (artifact_dir, upload_dir),
    }
}

pub async fn get(router: &Router, uri: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(router: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

/// POST a minimal multipart body; `pdf` omitted means no `pdf_file` field.
pub async fn post_pdf(router: &Router, uri: &str, pdf: Option<&[u8]>) -> Response<Body> {
    const BOUNDARY: &str = "test-boundary";
    let mut body = Vec::new();
    if let Some(pdf) = pdf {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"pdf_file\"; \
                 filename=\"paper.pdf\"\r\nContent-Type: application/pdf\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(pdf);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Poll the status endpoint until the job leaves `queued`/`processing`.
pub async fn poll_until_terminal(router: &Router, job_id: &str) -> serde_json::Value {
    for _ in 0..2000 {
        let response = get(router, &format!("/job-status/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let status = body_json(response).await;
        match status["status"].as_str() {
            Some("completed") | Some("failed") => return status,
            _ => tokio::time::sleep(std::time::Duration::from_millis(2)).await,
        }
    }
    panic!("job {job_id} never reached a terminal state");
}
