//! Filesystem-backed store for generated artifacts.
//!
//! Filenames are derived by the dispatcher (see `utils::filenames`) and
//! re-validated here, so a traversal attempt or collision is an error at
//! the store boundary too. Writes use create-new semantics; an existing
//! filename is a collision, never a silent overwrite.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::types::{AppError, AppResult};
use crate::utils::is_safe_filename;

/// Metadata for one stored artifact, as shown in the admin file browser.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ArtifactEntry {
    pub filename: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// An opened artifact ready for streaming to a client.
#[derive(Debug)]
pub struct ArtifactDownload {
    pub file: fs::File,
    pub size_bytes: u64,
    pub content_type: mime::Mime,
}

#[derive(Clone)]
pub struct ArtifactStore {
    root: Arc<PathBuf>,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the artifact directory if it does not exist yet.
    pub async fn init(&self) -> AppResult<()> {
        fs::create_dir_all(self.root.as_ref()).await?;
        Ok(())
    }

    /// Write a new artifact. Fails with `ArtifactExists` on a name collision.
    pub async fn put(&self, filename: &str, content: Bytes) -> AppResult<()> {
        let path = self.resolve(filename)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    AppError::ArtifactExists(filename.to_string())
                }
                _ => AppError::Io(e),
            })?;
        file.write_all(&content).await?;
        file.flush().await?;
        tracing::debug!(filename, size_bytes = content.len(), "Artifact written");
        Ok(())
    }

    /// Open an artifact for streaming, with its size and content type.
    pub async fn open(&self, filename: &str) -> AppResult<ArtifactDownload> {
        let path = self.resolve(filename)?;
        let file = fs::File::open(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::ArtifactNotFound(filename.to_string()),
            _ => AppError::Io(e),
        })?;
        let size_bytes = file.metadata().await?.len();
        let content_type = mime_guess::from_path(&path).first_or_octet_stream();
        Ok(ArtifactDownload {
            file,
            size_bytes,
            content_type,
        })
    }

    /// Snapshot of all stored artifacts. Order is unspecified.
    pub async fn list(&self) -> AppResult<Vec<ArtifactEntry>> {
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(self.root.as_ref()).await?;
        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().into_owned();
            entries.push(ArtifactEntry {
                filename,
                size_bytes: meta.len(),
                created_at: file_timestamp(&meta),
            });
        }
        Ok(entries)
    }

    /// Delete an artifact. Deleting a missing filename is a no-op.
    pub async fn delete(&self, filename: &str) -> AppResult<()> {
        let path = self.resolve(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Remove artifacts created before `cutoff`; returns how many went away.
    pub async fn sweep_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<usize> {
        let mut removed = 0;
        for entry in self.list().await? {
            if entry.created_at < cutoff {
                self.delete(&entry.filename).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn resolve(&self, filename: &str) -> AppResult<PathBuf> {
        if !is_safe_filename(filename) {
            return Err(AppError::InvalidRequest(format!(
                "unsafe filename: {filename:?}"
            )));
        }
        Ok(self.root.join(filename))
    }
}

/// Creation time where the platform records it, modification time otherwise.
fn file_timestamp(meta: &std::fs::Metadata) -> DateTime<Utc> {
    meta.created()
        .or_else(|_| meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}
