//! In-memory job table, the single source of truth for job state.
//!
//! Cloneable handle over shared state. The outer map lock is held only for
//! lookups and insert/remove; each record carries its own lock, so
//! transitions on the same ID serialize while different IDs proceed
//! independently and status reads never wait on an in-flight external call.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Job, JobRequest, JobState, JobUpdate};
use crate::types::{AppError, AppResult};

#[derive(Clone, Default)]
pub struct JobRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Arc<RwLock<Job>>>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new `Queued` job and return a snapshot of it.
    pub async fn create(&self, request: JobRequest) -> Job {
        let mut guard = self.inner.write().await;
        let mut id = Uuid::new_v4();
        // v4 collisions are vanishingly rare; the loop keeps concurrent
        // creates collision-free all the same.
        while guard.contains_key(&id) {
            id = Uuid::new_v4();
        }
        let now = Utc::now();
        let job = Job {
            id,
            kind: request.kind(),
            state: JobState::Queued,
            progress: 0,
            message: "Queued".to_string(),
            request,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        };
        guard.insert(id, Arc::new(RwLock::new(job.clone())));
        job
    }

    /// Snapshot of a job's current value.
    pub async fn get(&self, id: Uuid) -> AppResult<Job> {
        let slot = self.slot(id).await?;
        let job = slot.read().await;
        Ok(job.clone())
    }

    /// Claim a queued job for processing.
    ///
    /// Strictly `Queued -> Processing`; a second claim of the same job
    /// fails, which is what makes dispatch at-most-once.
    pub async fn claim(&self, id: Uuid, message: &str) -> AppResult<Job> {
        let slot = self.slot(id).await?;
        let mut job = slot.write().await;

        if job.state != JobState::Queued {
            return Err(AppError::InvalidTransition(format!(
                "job {id}: cannot claim from {:?}",
                job.state
            )));
        }

        job.state = JobState::Processing;
        job.progress = 5;
        job.message = message.to_string();
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    /// Atomically apply `update` to one record.
    ///
    /// Fails with `InvalidTransition` for any backward move or any write to
    /// a terminal record. `result` is kept only on `Completed`, `error`
    /// only on `Failed`. Progress never decreases while processing.
    pub async fn transition(&self, id: Uuid, update: JobUpdate) -> AppResult<Job> {
        let slot = self.slot(id).await?;
        let mut job = slot.write().await;

        if !job.state.can_transition_to(update.state) {
            return Err(AppError::InvalidTransition(format!(
                "job {id}: {:?} -> {:?}",
                job.state, update.state
            )));
        }

        job.state = update.state;
        job.progress = job.progress.max(update.progress.min(100));
        job.message = update.message;
        job.result = match update.state {
            JobState::Completed => update.result,
            _ => None,
        };
        job.error = match update.state {
            JobState::Failed => update.error,
            _ => None,
        };
        job.updated_at = Utc::now();

        tracing::debug!(
            job_id = %id,
            state = ?job.state,
            progress = job.progress,
            "Job transition applied"
        );
        Ok(job.clone())
    }

    /// Number of tracked jobs.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove terminal jobs last updated before `cutoff`.
    ///
    /// Queued and processing jobs are never removed, whatever their age.
    pub async fn sweep_terminal_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let expired: Vec<Uuid> = {
            let guard = self.inner.read().await;
            let mut ids = Vec::new();
            for (id, slot) in guard.iter() {
                let job = slot.read().await;
                if job.state.is_terminal() && job.updated_at < cutoff {
                    ids.push(*id);
                }
            }
            ids
        };

        if expired.is_empty() {
            return 0;
        }

        let mut guard = self.inner.write().await;
        let mut removed = 0;
        for id in expired {
            // Terminal states never regress, so the recheck-free remove is safe.
            if guard.remove(&id).is_some() {
                removed += 1;
            }
        }
        removed
    }

    async fn slot(&self, id: Uuid) -> AppResult<Arc<RwLock<Job>>> {
        let guard = self.inner.read().await;
        guard.get(&id).cloned().ok_or(AppError::JobNotFound(id))
    }
}
