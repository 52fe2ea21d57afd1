//! Periodic retention sweep for terminal jobs and aged artifacts.
//!
//! Jobs and artifacts have independent TTLs: a swept job's artifacts stay
//! downloadable until their own TTL lapses, and orphaned artifacts are
//! picked up by the same sweep.

use std::time::Duration;

use chrono::Utc;

use crate::config::RetentionConfig;
use crate::jobs::JobRegistry;
use crate::storage::ArtifactStore;

/// Run the sweep loop forever. Spawned once at startup.
pub async fn run(jobs: JobRegistry, artifacts: ArtifactStore, config: RetentionConfig) {
    let mut interval = tokio::time::interval(Duration::from_secs(config.sweep_interval_secs));
    tracing::info!(
        job_ttl_secs = config.job_ttl_secs,
        artifact_ttl_secs = config.artifact_ttl_secs,
        sweep_interval_secs = config.sweep_interval_secs,
        "Retention sweep started"
    );

    loop {
        interval.tick().await;

        let job_cutoff = Utc::now() - chrono::Duration::seconds(config.job_ttl_secs as i64);
        let removed_jobs = jobs.sweep_terminal_older_than(job_cutoff).await;
        if removed_jobs > 0 {
            let remaining = jobs.len().await;
            tracing::info!(removed_jobs, remaining, "Expired jobs swept");
        }

        let artifact_cutoff =
            Utc::now() - chrono::Duration::seconds(config.artifact_ttl_secs as i64);
        match artifacts.sweep_older_than(artifact_cutoff).await {
            Ok(removed) if removed > 0 => {
                tracing::info!(removed_artifacts = removed, "Expired artifacts swept");
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Artifact retention sweep failed"),
        }
    }
}
