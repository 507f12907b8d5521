use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use super::probe::MetadataExtractor;
use super::recording::Recording;
use crate::capture::RECORDING_FILE_EXT;

/// Catalog operation errors. All recoverable: the caller's in-memory state is
/// left consistent and the filesystem untouched unless documented otherwise.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The storage directory could not be listed at all. The scan result is
    /// empty; nothing was partially applied.
    #[error("could not scan {path}: {reason}")]
    ScanFailed { path: PathBuf, reason: String },

    /// A rename was requested with a blank display name.
    #[error("recording name must not be blank")]
    InvalidName,

    /// The filesystem rename failed; the original file and entry are intact.
    #[error("could not rename {path}: {reason}")]
    RenameFailed { path: PathBuf, reason: String },
}

/// Scan `dir` for recordings with the given extension (no leading dot),
/// probing each file's duration. The directory is created if missing.
///
/// Files whose metadata probe fails are skipped with a warning; one corrupt
/// file never aborts the scan. The result is sorted most-recently-modified
/// first, with a path-lexical tiebreak so equal timestamps order stably.
pub fn scan_directory(
    dir: &Path,
    extension: &str,
    probe: &dyn MetadataExtractor,
) -> Result<Vec<Recording>, CatalogError> {
    if !dir.exists() {
        match fs::create_dir_all(dir) {
            Ok(()) => debug!("created recordings directory {}", dir.display()),
            Err(e) => warn!("could not create {}: {}", dir.display(), e),
        }
    }

    // Take the listing up front; probing can be slow and a live directory
    // iterator would otherwise see files created mid-scan.
    let entries: Vec<_> = fs::read_dir(dir)
        .map_err(|e| CatalogError::ScanFailed {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?
        .collect();

    let mut recordings = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("unreadable directory entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !has_extension(&path, extension) {
            continue;
        }
        match build_recording(&path, probe) {
            Ok(recording) => recordings.push(recording),
            Err(e) => warn!("skipping {}: {:#}", path.display(), e),
        }
    }

    recordings.sort_by(|a, b| {
        b.modified_at_ms
            .cmp(&a.modified_at_ms)
            .then_with(|| a.path.cmp(&b.path))
    });

    Ok(recordings)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

fn build_recording(path: &Path, probe: &dyn MetadataExtractor) -> anyhow::Result<Recording> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("failed to read metadata for {}", path.display()))?;
    if !metadata.is_file() {
        anyhow::bail!("not a regular file");
    }

    let modified = metadata
        .modified()
        .with_context(|| format!("failed to read modified time for {}", path.display()))?;
    let modified_at_ms = DateTime::<Utc>::from(modified).timestamp_millis();

    let duration_ms = probe.probe_duration_ms(path)?;

    let name = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default()
        .to_string();

    Ok(Recording {
        name,
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
        modified_at_ms,
        duration_ms,
        is_playing: false,
    })
}

/// Rename a recording's file to `<new display name>.<old extension>` in the
/// same directory. The name is trimmed and must be non-blank; an existing
/// target or filesystem error leaves the original untouched. An occupied
/// target name is refused atomically (link-then-unlink rather than a plain
/// rename, which would silently overwrite a file created after any
/// existence check).
pub fn rename_recording(recording: &Recording, new_name: &str) -> Result<Recording, CatalogError> {
    let trimmed = new_name.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::InvalidName);
    }

    let parent = recording
        .path
        .parent()
        .ok_or_else(|| CatalogError::RenameFailed {
            path: recording.path.clone(),
            reason: "no parent directory".to_string(),
        })?;
    let extension = recording
        .path
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or(RECORDING_FILE_EXT);
    let target = parent.join(format!("{}.{}", trimmed, extension));

    let mut renamed = recording.clone();
    renamed.name = trimmed.to_string();
    if target == recording.path {
        return Ok(renamed);
    }

    fs::hard_link(&recording.path, &target).map_err(|e| CatalogError::RenameFailed {
        path: recording.path.clone(),
        reason: if e.kind() == ErrorKind::AlreadyExists {
            format!("target already exists: {}", target.display())
        } else {
            e.to_string()
        },
    })?;
    if let Err(e) = fs::remove_file(&recording.path) {
        // keep exactly one name for the file
        let _ = fs::remove_file(&target);
        return Err(CatalogError::RenameFailed {
            path: recording.path.clone(),
            reason: e.to_string(),
        });
    }

    renamed.path = target;
    Ok(renamed)
}

/// Best-effort filesystem delete. A missing file counts as already deleted.
/// Returns whether the file is gone from disk; failures are logged, not
/// propagated.
pub fn delete_file(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("deleted {}", path.display());
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("{} already gone", path.display());
            true
        }
        Err(e) => {
            warn!("failed to delete {}: {}", path.display(), e);
            false
        }
    }
}
