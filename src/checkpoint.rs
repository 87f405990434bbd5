//! Crawl checkpoints
//!
//! A checkpoint is a snapshot of an unfinished crawl: the unexpanded frontier plus
//! everything discovered so far, bound to the invocation that produced it by an
//! identity hash. The file is indented JSON so an operator can inspect or delete it.

use crate::error::StorageError;
use crate::types::{FileEntry, Folder, QueueItem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Snapshot of in-progress crawl state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub identity_hash: String,
    #[serde(default)]
    pub queue: Vec<QueueItem>,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    /// Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Checkpoint {
    pub fn new(
        identity_hash: impl Into<String>,
        queue: Vec<QueueItem>,
        folders: Vec<Folder>,
        files: Vec<FileEntry>,
    ) -> Self {
        Self {
            identity_hash: identity_hash.into(),
            queue,
            folders,
            files,
            saved_at: None,
        }
    }

    /// A checkpoint is usable only for the invocation that wrote it and only while
    /// it still has frontier left to expand.
    pub fn is_resumable_for(&self, identity_hash: &str) -> bool {
        self.identity_hash == identity_hash && !self.queue.is_empty()
    }
}

/// File-backed checkpoint store
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the checkpoint, creating missing parent directories.
    ///
    /// The document is written to a temporary file in the target directory and
    /// renamed over the old one, so a crash mid-write leaves the previous snapshot.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), StorageError> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(&dir)?;

        let mut snapshot = checkpoint.clone();
        snapshot.saved_at = Some(Utc::now());
        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StorageError::SerializeError(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StorageError::IoError(e.error))?;

        debug!(
            path = %self.path.display(),
            queue = checkpoint.queue.len(),
            folders = checkpoint.folders.len(),
            files = checkpoint.files.len(),
            "Checkpoint saved"
        );
        Ok(())
    }

    /// Load the checkpoint. A missing file is `Ok(None)`; unreadable contents are a
    /// `ParseError` and are never treated as empty.
    pub fn load(&self) -> Result<Option<Checkpoint>, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::IoError(e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::ParseError {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    /// Remove the checkpoint after a completed crawl. Missing is fine.
    pub fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
