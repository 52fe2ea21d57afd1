//! HTTP client for the content-generation service.

use async_trait::async_trait;
use serde_json::json;

use super::{ExtractionOutput, ExtractionRequest, GenerationBackend, GenerationOutput};
use crate::config::GeneratorConfig;
use crate::exams::Exam;
use crate::types::{AppError, AppResult};

pub struct HttpGenerationClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpGenerationClient {
    pub fn new(config: &GeneratorConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Read a non-2xx response into an `ExternalService` error, keeping the
    /// upstream body (truncated) as the failure reason.
    async fn error_from_response(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = body.chars().take(500).collect::<String>();
        AppError::ExternalService(format!("generation service returned {status}: {detail}"))
    }

    async fn file_part(path: &std::path::Path) -> AppResult<reqwest::multipart::Part> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        reqwest::multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(mime.as_ref())
            .map_err(|e| AppError::Internal(format!("invalid mime for upload part: {e}")))
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationClient {
    async fn generate_exam(
        &self,
        exam: Exam,
        questions_per_subject: u32,
    ) -> AppResult<GenerationOutput> {
        let body = json!({
            "exam_name": exam.name(),
            "subjects": exam.subjects(),
            "questions_per_subject": questions_per_subject,
        });

        let response = self
            .http
            .post(self.endpoint("/api/v1/generate-questions"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(response.json::<GenerationOutput>().await?)
    }

    async fn extract_pdf(&self, request: &ExtractionRequest) -> AppResult<ExtractionOutput> {
        let mut form = reqwest::multipart::Form::new()
            .text("exam_name", request.exam_name.clone())
            .text("year", request.year.clone())
            .text("subject", request.subject.clone())
            .part("pdf_file", Self::file_part(&request.pdf_path).await?);

        if let Some(key_path) = &request.answer_key_path {
            form = form.part("answer_key_file", Self::file_part(key_path).await?);
        }

        let response = self
            .http
            .post(self.endpoint("/api/v1/extract-pdf"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(response.json::<ExtractionOutput>().await?)
    }

    async fn health(&self) -> AppResult<()> {
        let response = self.http.get(self.endpoint("/health")).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }
}
