use serde::Serialize;
use std::path::PathBuf;

use crate::format;

/// One captured audio file on disk. The filesystem is the source of truth;
/// these entries are rebuilt on every scan and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recording {
    /// Display name: the filename with its extension stripped
    pub name: String,

    /// Absolute path; uniquely identifies the recording
    pub path: PathBuf,

    /// File size in bytes
    pub size_bytes: u64,

    /// Last-modified time, epoch milliseconds
    pub modified_at_ms: i64,

    /// Media duration in milliseconds, from the metadata probe
    pub duration_ms: u64,

    /// Transient playback flag; owned by the playback collaborator, true for
    /// at most one recording at a time. Never persisted.
    #[serde(skip)]
    pub is_playing: bool,
}

impl Recording {
    pub fn size_display(&self) -> String {
        format::human_size(self.size_bytes)
    }

    pub fn duration_display(&self) -> String {
        format::human_duration_short(self.duration_ms)
    }

    pub fn duration_display_detailed(&self) -> String {
        format::human_duration_detailed(self.duration_ms)
    }

    pub fn modified_display(&self) -> String {
        format::human_date(self.modified_at_ms)
    }
}
