use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use super::probe::MetadataExtractor;
use super::recording::Recording;
use super::scanner::{self, CatalogError};

/// In-memory catalog of the recordings directory.
///
/// Scans run off the caller's path on the blocking pool and the snapshot is
/// swapped atomically once a full scan completes; readers never observe a
/// partially-built list. Overlapping refreshes are sequence-stamped and the
/// newest scan wins, so a stale completion cannot clobber fresher data.
pub struct FileCatalog {
    directory: PathBuf,
    extension: String,
    probe: Arc<dyn MetadataExtractor>,
    recordings: Arc<RwLock<Vec<Recording>>>,
    scan_seq: AtomicU64,
    applied_seq: AtomicU64,
}

impl FileCatalog {
    pub fn new(
        directory: PathBuf,
        extension: impl Into<String>,
        probe: Arc<dyn MetadataExtractor>,
    ) -> Self {
        Self {
            directory,
            extension: extension.into(),
            probe,
            recordings: Arc::new(RwLock::new(Vec::new())),
            scan_seq: AtomicU64::new(0),
            applied_seq: AtomicU64::new(0),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Clone of the current ordered snapshot.
    pub async fn snapshot(&self) -> Vec<Recording> {
        self.recordings.read().await.clone()
    }

    /// Rescan the directory and swap in the result.
    ///
    /// On `ScanFailed` the snapshot is replaced with an empty list and the
    /// error is returned; the failure is recoverable and the catalog stays
    /// consistent. Returns the freshly scanned list on success (which may be
    /// older than the applied snapshot if a newer refresh finished first).
    pub async fn refresh(&self) -> Result<Vec<Recording>, CatalogError> {
        let token = self.scan_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let dir = self.directory.clone();
        let extension = self.extension.clone();
        let probe = Arc::clone(&self.probe);
        let scanned = tokio::task::spawn_blocking(move || {
            scanner::scan_directory(&dir, &extension, probe.as_ref())
        })
        .await
        .unwrap_or_else(|e| {
            error!("scan task failed: {}", e);
            Err(CatalogError::ScanFailed {
                path: self.directory.clone(),
                reason: format!("scan task failed: {}", e),
            })
        });

        match scanned {
            Ok(recordings) => {
                info!(
                    "scan of {} found {} recordings",
                    self.directory.display(),
                    recordings.len()
                );
                self.apply(token, recordings.clone()).await;
                Ok(recordings)
            }
            Err(e) => {
                error!("scan of {} failed: {}", self.directory.display(), e);
                self.apply(token, Vec::new()).await;
                Err(e)
            }
        }
    }

    /// Swap in a completed scan unless a newer one already landed. The write
    /// lock orders the check and the swap.
    async fn apply(&self, token: u64, recordings: Vec<Recording>) {
        let mut guard = self.recordings.write().await;
        if token > self.applied_seq.load(Ordering::Acquire) {
            self.applied_seq.store(token, Ordering::Release);
            *guard = recordings;
        }
    }

    /// Rename the cataloged recording at `path`. On success the entry is
    /// updated in place, so the displayed order is preserved even though the
    /// file's modified time changed.
    pub async fn rename(&self, path: &Path, new_name: &str) -> Result<Recording, CatalogError> {
        let mut guard = self.recordings.write().await;
        let entry = guard
            .iter_mut()
            .find(|r| r.path == path)
            .ok_or_else(|| CatalogError::RenameFailed {
                path: path.to_path_buf(),
                reason: "not in catalog".to_string(),
            })?;

        let renamed = scanner::rename_recording(entry, new_name)?;
        *entry = renamed.clone();
        Ok(renamed)
    }

    /// Delete the recording at `path`. The catalog entry is always removed —
    /// a stale row is more surprising than an under-reported delete failure —
    /// and the return value says whether the file is actually gone from disk.
    pub async fn delete(&self, path: &Path) -> bool {
        {
            let mut guard = self.recordings.write().await;
            guard.retain(|r| r.path != path);
        }
        scanner::delete_file(path)
    }
}
