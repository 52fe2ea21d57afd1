//! Job records and their lifecycle.
//!
//! A [`Job`] tracks one asynchronous generation operation from submission
//! to a terminal state. State moves strictly forward
//! (`Queued -> Processing -> Completed | Failed`); the registry rejects
//! anything else, so a poller can never observe a regression.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use registry::JobRegistry;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::exams::Exam;

/// What kind of generation work a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    ExamGeneration,
    PdfExtraction,
}

/// Lifecycle state of a job. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            JobState::Queued => 0,
            JobState::Processing => 1,
            JobState::Completed | JobState::Failed => 2,
        }
    }

    /// Whether a record in `self` may be rewritten to `next`.
    ///
    /// Terminal states accept nothing; otherwise the state must not move
    /// backward. `Processing -> Processing` is allowed so the background
    /// task can publish progress updates.
    pub fn can_transition_to(self, next: JobState) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }
}

/// Classification of a background-execution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ExternalService,
    Timeout,
    Internal,
}

/// Immutable copy of the validated submission input, captured at creation
/// so the background task never re-reads external mutable state.
#[derive(Debug, Clone)]
pub enum JobRequest {
    ExamGeneration {
        exam: Exam,
        questions_per_subject: u32,
    },
    PdfExtraction {
        exam_name: String,
        year: String,
        subject: String,
        pdf_path: PathBuf,
        answer_key_path: Option<PathBuf>,
    },
}

impl JobRequest {
    pub fn kind(&self) -> JobKind {
        match self {
            JobRequest::ExamGeneration { .. } => JobKind::ExamGeneration,
            JobRequest::PdfExtraction { .. } => JobKind::PdfExtraction,
        }
    }

    /// Staged upload files this request owns until execution finishes.
    pub fn staged_inputs(&self) -> Vec<PathBuf> {
        match self {
            JobRequest::ExamGeneration { .. } => Vec::new(),
            JobRequest::PdfExtraction {
                pdf_path,
                answer_key_path,
                ..
            } => {
                let mut paths = vec![pdf_path.clone()];
                if let Some(key) = answer_key_path {
                    paths.push(key.clone());
                }
                paths
            }
        }
    }
}

/// Result metadata of a completed job. Holds artifact filenames, never bytes.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub total_questions: usize,
    pub files: Vec<String>,
    pub warnings: Vec<String>,
}

/// Captured failure of a job's background execution.
#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// One tracked unit of asynchronous generation work.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub kind: JobKind,
    pub state: JobState,
    pub progress: u8,
    pub message: String,
    pub request: JobRequest,
    pub result: Option<JobOutcome>,
    pub error: Option<JobFailure>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The mutable fields a single transition writes.
#[derive(Debug, Clone)]
pub struct JobUpdate {
    pub state: JobState,
    pub progress: u8,
    pub message: String,
    pub result: Option<JobOutcome>,
    pub error: Option<JobFailure>,
}

impl JobUpdate {
    pub fn processing(progress: u8, message: impl Into<String>) -> Self {
        Self {
            state: JobState::Processing,
            progress,
            message: message.into(),
            result: None,
            error: None,
        }
    }

    pub fn completed(message: impl Into<String>, outcome: JobOutcome) -> Self {
        Self {
            state: JobState::Completed,
            progress: 100,
            message: message.into(),
            result: Some(outcome),
            error: None,
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            state: JobState::Failed,
            progress: 100,
            message: message.clone(),
            result: None,
            error: Some(JobFailure { kind, message }),
        }
    }
}
