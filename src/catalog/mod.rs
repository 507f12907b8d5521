//! File catalog
//!
//! This module maintains the browsable list of captured recordings:
//! - `FileCatalog`: in-memory snapshot with background refresh
//! - `scanner`: directory scan, rename, and delete primitives
//! - `SymphoniaProbe`: duration extraction from media headers
//! - `Recording`: the per-file entry

#[allow(clippy::module_inception)]
mod catalog;
mod probe;
mod recording;
mod scanner;

pub use catalog::FileCatalog;
pub use probe::{MetadataExtractor, SymphoniaProbe};
pub use recording::Recording;
pub use scanner::{delete_file, rename_recording, scan_directory, CatalogError};
