pub mod capture;
pub mod catalog;
pub mod config;
pub mod format;
pub mod session;

pub use capture::{
    CaptureDevice, CaptureSettings, DeviceError, MicCaptureDevice, QualityProfile,
    RECORDING_FILE_EXT,
};
pub use catalog::{CatalogError, FileCatalog, MetadataExtractor, Recording, SymphoniaProbe};
pub use config::Config;
pub use session::{
    default_recording_name, RecorderState, RecordingController, RecordingTimeTracker, SessionError,
    StateChange,
};
