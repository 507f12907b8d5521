use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// File extension used for captured recordings.
pub const RECORDING_FILE_EXT: &str = "wav";

/// Capture device errors, classified so callers can tell transient device
/// contention apart from misuse and real I/O failure.
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("capture I/O error: {0}")]
    Io(String),

    #[error("capture device busy: {0}")]
    Busy(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("illegal device state: {0}")]
    IllegalState(&'static str),

    #[error("not supported: {0}")]
    Unsupported(String),
}

impl DeviceError {
    /// Classify a filesystem error into the device error taxonomy.
    pub fn classify_io(err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::PermissionDenied => DeviceError::PermissionDenied(err.to_string()),
            _ => DeviceError::Io(err.to_string()),
        }
    }
}

/// Audio quality preset, selected via configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QualityProfile {
    Normal,
    High,
}

impl Default for QualityProfile {
    fn default() -> Self {
        QualityProfile::Normal
    }
}

impl QualityProfile {
    pub fn sample_rate(self) -> u32 {
        match self {
            QualityProfile::Normal => 22_050,
            QualityProfile::High => 44_100,
        }
    }

    /// Encoding bit rate: 16 bits per sample at the profile's sampling rate.
    pub fn bit_rate(self) -> u32 {
        16 * self.sample_rate()
    }

    pub fn settings(self, output_path: PathBuf) -> CaptureSettings {
        CaptureSettings {
            sample_rate: self.sample_rate(),
            bit_rate: self.bit_rate(),
            output_path,
        }
    }
}

/// Settings handed to a capture device before starting a session.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Requested sampling rate in Hz
    pub sample_rate: u32,
    /// Requested encoding bit rate in bits per second
    pub bit_rate: u32,
    /// File the device writes the encoded audio to
    pub output_path: PathBuf,
}

/// Platform audio capture seam.
///
/// Implementations wrap whatever the OS offers for microphone capture; the
/// session controller is the only component allowed to drive one. Devices
/// that cannot pause mid-stream return `false` from `supports_pause` and the
/// controller rejects pause/resume up front.
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Apply settings for the next capture. Illegal while capturing.
    fn configure(&mut self, settings: &CaptureSettings) -> Result<(), DeviceError>;

    /// Start capturing to the configured output path.
    async fn start(&mut self) -> Result<(), DeviceError>;

    /// Pause capture mid-stream, keeping the output file open.
    async fn pause(&mut self) -> Result<(), DeviceError>;

    /// Resume a paused capture.
    async fn resume(&mut self) -> Result<(), DeviceError>;

    /// Stop capturing and finalize the output file.
    async fn stop(&mut self) -> Result<(), DeviceError>;

    /// Return the device to a clean idle state, releasing any capture
    /// resources. Never fails; problems are logged.
    fn reset(&mut self);

    /// Whether mid-stream pause/resume is available.
    fn supports_pause(&self) -> bool;

    /// Device name for logging and error reports.
    fn name(&self) -> &str;
}
