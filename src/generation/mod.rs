//! Boundary to the external content-generation service.
//!
//! The service is a black box reachable over HTTP: one call, one logical
//! outcome (payload or failure). Everything behind [`GenerationBackend`]
//! is swappable, which is also how tests inject scripted behaviour.

pub mod client;

pub use client::HttpGenerationClient;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::exams::Exam;
use crate::types::AppResult;

/// One generated or extracted question.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedQuestion {
    pub subject: String,
    pub text: String,
    pub options: Vec<String>,
    pub answer: String,
}

/// Payload returned for an AI exam-generation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationOutput {
    pub questions: Vec<GeneratedQuestion>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Input for a PDF extraction call: staged source files plus exam context.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub exam_name: String,
    pub year: String,
    pub subject: String,
    pub pdf_path: PathBuf,
    pub answer_key_path: Option<PathBuf>,
}

/// Payload returned for a PDF extraction request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionOutput {
    pub questions: Vec<GeneratedQuestion>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub report: String,
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Author a question set for `exam`, `questions_per_subject` per subject.
    async fn generate_exam(
        &self,
        exam: Exam,
        questions_per_subject: u32,
    ) -> AppResult<GenerationOutput>;

    /// Extract structured questions from an uploaded past-paper PDF.
    async fn extract_pdf(&self, request: &ExtractionRequest) -> AppResult<ExtractionOutput>;

    /// Liveness probe of the service dependency.
    async fn health(&self) -> AppResult<()>;
}
