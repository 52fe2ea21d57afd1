//! Validates generation requests, creates job records, and drives their
//! background execution.
//!
//! Submission returns as soon as the job record exists; everything slow
//! happens on a spawned task whose whole run is bounded by the execution
//! ceiling. Every path out of the background task lands the job in a
//! terminal state and discards staged upload files.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use uuid::Uuid;

use crate::exams::{Exam, MAX_QUESTIONS_PER_SUBJECT, MIN_QUESTIONS_PER_SUBJECT};
use crate::generation::{ExtractionRequest, GeneratedQuestion, GenerationBackend};
use crate::jobs::{FailureKind, JobOutcome, JobRegistry, JobRequest, JobUpdate};
use crate::storage::ArtifactStore;
use crate::types::{AppError, AppResult};
use crate::utils::artifact_filename;

/// A staged PDF-extraction submission, files already written to the upload
/// directory by the HTTP layer.
#[derive(Debug, Clone)]
pub struct PdfSubmission {
    pub exam_name: String,
    pub year: String,
    pub subject: String,
    pub pdf_path: PathBuf,
    pub answer_key_path: Option<PathBuf>,
}

#[derive(Clone)]
pub struct Dispatcher {
    jobs: JobRegistry,
    artifacts: ArtifactStore,
    backend: Arc<dyn GenerationBackend>,
    execution_ceiling: Duration,
}

impl Dispatcher {
    pub fn new(
        jobs: JobRegistry,
        artifacts: ArtifactStore,
        backend: Arc<dyn GenerationBackend>,
        execution_ceiling: Duration,
    ) -> Self {
        Self {
            jobs,
            artifacts,
            backend,
            execution_ceiling,
        }
    }

    /// Validate and enqueue an AI exam-generation job. Returns the job ID
    /// immediately; generation happens in the background.
    pub async fn submit_exam_generation(
        &self,
        exam_name: &str,
        questions_per_subject: u32,
    ) -> AppResult<Uuid> {
        let exam: Exam = exam_name.parse().map_err(|_| {
            AppError::InvalidRequest(format!(
                "unsupported exam '{exam_name}'; expected one of: {}",
                crate::exams::supported_exams()
            ))
        })?;

        if !(MIN_QUESTIONS_PER_SUBJECT..=MAX_QUESTIONS_PER_SUBJECT).contains(&questions_per_subject)
        {
            return Err(AppError::InvalidRequest(format!(
                "questions_per_subject must be between {MIN_QUESTIONS_PER_SUBJECT} and {MAX_QUESTIONS_PER_SUBJECT}, got {questions_per_subject}"
            )));
        }

        let job = self
            .jobs
            .create(JobRequest::ExamGeneration {
                exam,
                questions_per_subject,
            })
            .await;
        tracing::info!(job_id = %job.id, %exam, questions_per_subject, "Exam generation job queued");
        self.spawn_execution(job.id);
        Ok(job.id)
    }

    /// Validate and enqueue a PDF-to-CSV extraction job.
    ///
    /// The staged uploads belong to the job from here on; if validation
    /// fails they are discarded and no job is created.
    pub async fn submit_pdf_extraction(&self, submission: PdfSubmission) -> AppResult<Uuid> {
        if let Err(e) = validate_pdf_submission(&submission) {
            self.discard_files(
                std::iter::once(&submission.pdf_path)
                    .chain(submission.answer_key_path.as_ref()),
            )
            .await;
            return Err(e);
        }

        let job = self
            .jobs
            .create(JobRequest::PdfExtraction {
                exam_name: submission.exam_name,
                year: submission.year,
                subject: submission.subject,
                pdf_path: submission.pdf_path,
                answer_key_path: submission.answer_key_path,
            })
            .await;
        tracing::info!(job_id = %job.id, "PDF extraction job queued");
        self.spawn_execution(job.id);
        Ok(job.id)
    }

    /// One spawned task per job; the job ID is freshly minted so this is the
    /// only dispatch that will ever run for it. The claim inside `run`
    /// guards against accidental double-spawn regardless.
    fn spawn_execution(&self, id: Uuid) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run(id).await;
        });
    }

    async fn run(&self, id: Uuid) {
        if let Err(e) = self.jobs.claim(id, "Dispatched to generation service").await {
            tracing::warn!(job_id = %id, error = %e, "Skipping dispatch: job not claimable");
            return;
        }

        let outcome = tokio::time::timeout(self.execution_ceiling, self.execute(id)).await;

        // The staged inputs have been consumed (or the call failed); drop
        // them before publishing the terminal state.
        if let Ok(job) = self.jobs.get(id).await {
            self.discard_files(job.request.staged_inputs().iter()).await;
        }

        let update = match outcome {
            Ok(Ok(result)) => {
                tracing::info!(
                    job_id = %id,
                    total_questions = result.total_questions,
                    files = ?result.files,
                    "Job completed"
                );
                let message = format!("Generated {} questions", result.total_questions);
                JobUpdate::completed(message, result)
            }
            Ok(Err(err)) => {
                tracing::warn!(job_id = %id, error = %err, "Job failed");
                JobUpdate::failed(classify_failure(&err), err.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    job_id = %id,
                    ceiling_secs = self.execution_ceiling.as_secs(),
                    "Job exceeded execution ceiling"
                );
                JobUpdate::failed(
                    FailureKind::Timeout,
                    format!(
                        "generation exceeded the {:?} execution ceiling",
                        self.execution_ceiling
                    ),
                )
            }
        };

        if let Err(e) = self.jobs.transition(id, update).await {
            tracing::error!(job_id = %id, error = %e, "Failed to publish terminal job state");
        }
    }

    async fn execute(&self, id: Uuid) -> AppResult<JobOutcome> {
        let job = self.jobs.get(id).await?;
        match job.request {
            JobRequest::ExamGeneration {
                exam,
                questions_per_subject,
            } => self.execute_exam_generation(id, exam, questions_per_subject).await,
            JobRequest::PdfExtraction {
                exam_name,
                year,
                subject,
                pdf_path,
                answer_key_path,
            } => {
                let request = ExtractionRequest {
                    exam_name,
                    year,
                    subject,
                    pdf_path,
                    answer_key_path,
                };
                self.execute_pdf_extraction(id, request).await
            }
        }
    }

    async fn execute_exam_generation(
        &self,
        id: Uuid,
        exam: Exam,
        questions_per_subject: u32,
    ) -> AppResult<JobOutcome> {
        self.checkpoint(id, 25, "Calling generation service").await?;
        let output = self
            .backend
            .generate_exam(exam, questions_per_subject)
            .await?;

        self.checkpoint(id, 75, "Writing question set").await?;
        let filename = artifact_filename(&format!("{exam} questions"), id, "csv");
        let csv = question_set_csv(&output.questions)?;
        self.artifacts.put(&filename, csv).await?;

        Ok(JobOutcome {
            total_questions: output.questions.len(),
            files: vec![filename],
            warnings: output.warnings,
        })
    }

    async fn execute_pdf_extraction(
        &self,
        id: Uuid,
        request: ExtractionRequest,
    ) -> AppResult<JobOutcome> {
        self.checkpoint(id, 25, "Extracting questions from PDF").await?;
        let output = self.backend.extract_pdf(&request).await?;

        self.checkpoint(id, 75, "Writing question set and report").await?;
        let label = format!("{} {} {}", request.exam_name, request.subject, request.year);

        let csv_name = artifact_filename(&format!("{label} extracted"), id, "csv");
        self.artifacts
            .put(&csv_name, question_set_csv(&output.questions)?)
            .await?;

        let report_name = artifact_filename(&format!("{label} report"), id, "txt");
        self.artifacts
            .put(&report_name, extraction_report(&output.report, &output.warnings))
            .await?;

        Ok(JobOutcome {
            total_questions: output.questions.len(),
            files: vec![csv_name, report_name],
            warnings: output.warnings,
        })
    }

    async fn checkpoint(&self, id: Uuid, progress: u8, message: &str) -> AppResult<()> {
        self.jobs
            .transition(id, JobUpdate::processing(progress, message))
            .await?;
        Ok(())
    }

    /// Best-effort removal of staged uploads. Failures are logged and never
    /// change the job outcome.
    async fn discard_files(&self, paths: impl Iterator<Item = &PathBuf>) {
        for path in paths {
            match tokio::fs::remove_file(path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "Staged upload removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged upload")
                }
            }
        }
    }
}

fn validate_pdf_submission(submission: &PdfSubmission) -> AppResult<()> {
    for (field, value) in [
        ("exam_name", &submission.exam_name),
        ("year", &submission.year),
        ("subject", &submission.subject),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::InvalidRequest(format!("{field} must not be empty")));
        }
    }
    Ok(())
}

fn classify_failure(err: &AppError) -> FailureKind {
    match err {
        AppError::Timeout(_) => FailureKind::Timeout,
        AppError::ExternalService(_) => FailureKind::ExternalService,
        _ => FailureKind::Internal,
    }
}

/// Render generated questions as the question-set CSV artifact.
fn question_set_csv(questions: &[GeneratedQuestion]) -> AppResult<Bytes> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        "subject", "question", "option_a", "option_b", "option_c", "option_d", "answer",
    ])
    .map_err(|e| AppError::Internal(format!("csv write failed: {e}")))?;

    for q in questions {
        let option = |i: usize| q.options.get(i).map(String::as_str).unwrap_or("");
        wtr.write_record([
            q.subject.as_str(),
            q.text.as_str(),
            option(0),
            option(1),
            option(2),
            option(3),
            q.answer.as_str(),
        ])
        .map_err(|e| AppError::Internal(format!("csv write failed: {e}")))?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("csv flush failed: {e}")))?;
    Ok(Bytes::from(data))
}

/// Render the human-readable extraction report artifact.
fn extraction_report(report: &str, warnings: &[String]) -> Bytes {
    let mut text = String::from(report);
    if !warnings.is_empty() {
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str("Warnings:\n");
        for warning in warnings {
            text.push_str("- ");
            text.push_str(warning);
            text.push('\n');
        }
    }
    Bytes::from(text)
}
