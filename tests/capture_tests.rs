// Integration tests for the microphone capture device's idle contract
//
// These tests never open an audio stream; they pin down the command surface
// that must hold before any hardware gets involved, and that every rejection
// returns promptly instead of blocking the runtime.

use std::path::PathBuf;

use audiolog::{CaptureDevice, DeviceError, MicCaptureDevice, QualityProfile};

fn settings() -> audiolog::CaptureSettings {
    QualityProfile::High.settings(PathBuf::from("capture.wav"))
}

#[tokio::test]
async fn test_idle_device_rejects_transport_commands() {
    let mut device = MicCaptureDevice::new();

    assert!(matches!(
        device.pause().await,
        Err(DeviceError::IllegalState(_))
    ));
    assert!(matches!(
        device.resume().await,
        Err(DeviceError::IllegalState(_))
    ));
    assert!(matches!(
        device.stop().await,
        Err(DeviceError::IllegalState(_))
    ));
}

#[tokio::test]
async fn test_start_requires_configure() {
    let mut device = MicCaptureDevice::new();
    assert!(matches!(
        device.start().await,
        Err(DeviceError::IllegalState(_))
    ));
}

#[test]
fn test_configure_while_idle_is_repeatable() {
    let mut device = MicCaptureDevice::new();
    assert!(device.configure(&settings()).is_ok());
    assert!(device.configure(&settings()).is_ok());
}

#[test]
fn test_reset_on_idle_device_is_harmless() {
    let mut device = MicCaptureDevice::new();
    device.configure(&settings()).unwrap();
    device.reset();
    device.reset();
}

#[test]
fn test_reports_pause_support() {
    let device = MicCaptureDevice::new();
    assert!(device.supports_pause());
    assert_eq!(device.name(), "cpal-microphone");
}
