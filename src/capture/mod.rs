//! Audio capture devices
//!
//! The `CaptureDevice` trait is the seam between the recording session
//! controller and whatever the platform offers for microphone capture.
//! `MicCaptureDevice` is the cpal-backed implementation writing WAV files.

mod device;
mod mic;

pub use device::{CaptureDevice, CaptureSettings, DeviceError, QualityProfile, RECORDING_FILE_EXT};
pub use mic::MicCaptureDevice;
