use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::generation::GenerationBackend;
use crate::jobs::{Dispatcher, Job, JobFailure, JobOutcome, JobRegistry, JobState};
use crate::storage::ArtifactStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jobs: JobRegistry,
    pub artifacts: ArtifactStore,
    pub dispatcher: Dispatcher,
    pub backend: Arc<dyn GenerationBackend>,
}

impl AppState {
    /// Wire the shared state from configuration and a generation backend.
    pub fn new(config: Config, backend: Arc<dyn GenerationBackend>) -> Self {
        let jobs = JobRegistry::new();
        let artifacts = ArtifactStore::new(&config.storage.artifact_dir);
        let dispatcher = Dispatcher::new(
            jobs.clone(),
            artifacts.clone(),
            backend.clone(),
            Duration::from_secs(config.generator.request_timeout_secs),
        );
        Self {
            config,
            jobs,
            artifacts,
            dispatcher,
            backend,
        }
    }
}

// API request/response types

#[derive(Debug, Deserialize)]
pub struct GenerateExamRequest {
    pub exam_name: String,
    pub questions_per_subject: u32,
}

#[derive(Debug, Deserialize)]
pub struct PdfToCsvParams {
    pub exam_name: String,
    pub year: String,
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct JobSubmitResponse {
    pub job_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobState,
    pub progress: u8,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JobFailure>,
}

impl From<Job> for JobStatusResponse {
    fn from(job: Job) -> Self {
        Self {
            job_id: job.id,
            status: job.state,
            progress: job.progress,
            message: job.message,
            result: job.result,
            error: job.error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub filename: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedFilesResponse {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub generator: String,
    pub timestamp: String,
}
