// Integration tests for the recording session controller
//
// These tests drive the state machine with a mock capture device and verify
// the transition table, event emission, and failure recovery.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use audiolog::{
    CaptureDevice, CaptureSettings, DeviceError, QualityProfile, RecorderState,
    RecordingController, SessionError,
};
use tempfile::TempDir;
use tokio::sync::broadcast::error::TryRecvError;

#[derive(Default)]
struct MockState {
    calls: Vec<&'static str>,
    fail_start: bool,
    fail_pause: bool,
    supports_pause: bool,
    configured_sample_rate: Option<u32>,
}

struct MockDevice {
    state: Arc<Mutex<MockState>>,
}

impl MockDevice {
    fn new(supports_pause: bool) -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState {
            supports_pause,
            ..MockState::default()
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }

    fn record(&self, call: &'static str) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl CaptureDevice for MockDevice {
    fn configure(&mut self, settings: &CaptureSettings) -> Result<(), DeviceError> {
        self.state.lock().unwrap().configured_sample_rate = Some(settings.sample_rate);
        self.record("configure");
        Ok(())
    }

    async fn start(&mut self) -> Result<(), DeviceError> {
        if self.state.lock().unwrap().fail_start {
            return Err(DeviceError::Busy("simulated".to_string()));
        }
        self.record("start");
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), DeviceError> {
        if self.state.lock().unwrap().fail_pause {
            return Err(DeviceError::Io("simulated".to_string()));
        }
        self.record("pause");
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), DeviceError> {
        self.record("resume");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), DeviceError> {
        self.record("stop");
        Ok(())
    }

    fn reset(&mut self) {
        self.record("reset");
    }

    fn supports_pause(&self) -> bool {
        self.state.lock().unwrap().supports_pause
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn new_controller(supports_pause: bool) -> (RecordingController, Arc<Mutex<MockState>>, TempDir) {
    let (device, state) = MockDevice::new(supports_pause);
    let controller = RecordingController::new(Box::new(device));
    let temp_dir = TempDir::new().expect("temp dir");
    (controller, state, temp_dir)
}

fn dir(temp: &TempDir) -> PathBuf {
    temp.path().join("recordings")
}

#[tokio::test]
async fn test_full_lifecycle_follows_transition_table() -> Result<()> {
    let (mut controller, state, temp) = new_controller(true);
    assert_eq!(controller.state(), RecorderState::Stopped);

    let path = controller.start(&dir(&temp), QualityProfile::High).await?;
    assert_eq!(controller.state(), RecorderState::Recording);
    assert_eq!(controller.output_path(), Some(path.as_path()));

    controller.pause().await?;
    assert_eq!(controller.state(), RecorderState::Paused);

    controller.resume().await?;
    assert_eq!(controller.state(), RecorderState::Resumed);

    // RESUMED accepts another pause
    controller.pause().await?;
    assert_eq!(controller.state(), RecorderState::Paused);

    let finished = controller.stop().await?;
    assert_eq!(controller.state(), RecorderState::Stopped);
    assert_eq!(finished, path);
    assert_eq!(controller.output_path(), None);

    let calls = state.lock().unwrap().calls.clone();
    assert_eq!(
        calls,
        vec!["configure", "start", "pause", "resume", "pause", "stop", "reset"]
    );
    Ok(())
}

#[tokio::test]
async fn test_start_commits_output_path_in_directory() -> Result<()> {
    let (mut controller, state, temp) = new_controller(true);
    let output_dir = dir(&temp);

    let path = controller.start(&output_dir, QualityProfile::Normal).await?;

    // Directory is created if absent
    assert!(output_dir.is_dir());
    assert_eq!(path.parent(), Some(output_dir.as_path()));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("wav"));

    // Quality profile reaches the device
    assert_eq!(
        state.lock().unwrap().configured_sample_rate,
        Some(QualityProfile::Normal.sample_rate())
    );
    Ok(())
}

#[tokio::test]
async fn test_invalid_transitions_are_rejected_and_state_unchanged() -> Result<()> {
    let (mut controller, _state, temp) = new_controller(true);

    // pause/resume/stop while stopped
    assert!(matches!(
        controller.pause().await,
        Err(SessionError::InvalidTransition { .. })
    ));
    assert!(matches!(
        controller.resume().await,
        Err(SessionError::InvalidTransition { .. })
    ));
    assert!(matches!(
        controller.stop().await,
        Err(SessionError::InvalidTransition { .. })
    ));
    assert_eq!(controller.state(), RecorderState::Stopped);

    // start while recording
    controller.start(&dir(&temp), QualityProfile::Normal).await?;
    assert!(matches!(
        controller.start(&dir(&temp), QualityProfile::Normal).await,
        Err(SessionError::InvalidTransition { .. })
    ));
    assert_eq!(controller.state(), RecorderState::Recording);

    // resume while recording (only legal from paused)
    assert!(matches!(
        controller.resume().await,
        Err(SessionError::InvalidTransition { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_double_stop_is_rejected_without_double_release() -> Result<()> {
    let (mut controller, state, temp) = new_controller(true);

    controller.start(&dir(&temp), QualityProfile::Normal).await?;
    controller.stop().await?;

    assert!(matches!(
        controller.stop().await,
        Err(SessionError::InvalidTransition { .. })
    ));

    let calls = state.lock().unwrap().calls.clone();
    let resets = calls.iter().filter(|c| **c == "reset").count();
    assert_eq!(resets, 1, "second stop must not touch the device again");
    Ok(())
}

#[tokio::test]
async fn test_pause_unsupported_device_is_capability_error() -> Result<()> {
    let (mut controller, _state, temp) = new_controller(false);

    controller.start(&dir(&temp), QualityProfile::Normal).await?;
    assert!(matches!(
        controller.pause().await,
        Err(SessionError::CapabilityUnsupported { .. })
    ));
    // State unchanged; the session keeps recording
    assert_eq!(controller.state(), RecorderState::Recording);
    Ok(())
}

#[tokio::test]
async fn test_failed_start_resets_device_and_stays_stopped() {
    let (mut controller, state, temp) = new_controller(true);
    state.lock().unwrap().fail_start = true;

    let result = controller.start(&dir(&temp), QualityProfile::Normal).await;
    assert!(matches!(
        result,
        Err(SessionError::StartFailed(DeviceError::Busy(_)))
    ));
    assert_eq!(controller.state(), RecorderState::Stopped);
    assert_eq!(controller.output_path(), None);

    let calls = state.lock().unwrap().calls.clone();
    assert!(calls.contains(&"reset"), "device must be reset after a failed start");
}

#[tokio::test]
async fn test_device_fault_during_pause_resets_to_stopped() -> Result<()> {
    let (mut controller, state, temp) = new_controller(true);

    controller.start(&dir(&temp), QualityProfile::Normal).await?;
    state.lock().unwrap().fail_pause = true;

    assert!(matches!(
        controller.pause().await,
        Err(SessionError::Device(DeviceError::Io(_)))
    ));
    assert_eq!(controller.state(), RecorderState::Stopped);
    assert_eq!(controller.output_path(), None);
    Ok(())
}

#[tokio::test]
async fn test_each_command_emits_exactly_one_event() -> Result<()> {
    let (mut controller, _state, temp) = new_controller(true);
    let mut events = controller.subscribe();

    controller.start(&dir(&temp), QualityProfile::Normal).await?;
    controller.pause().await?;
    controller.resume().await?;
    controller.stop().await?;

    let states: Vec<RecorderState> = (0..4).map(|_| events.try_recv().unwrap().state).collect();
    assert_eq!(
        states,
        vec![
            RecorderState::Recording,
            RecorderState::Paused,
            RecorderState::Resumed,
            RecorderState::Stopped,
        ]
    );
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    // The start event carries the committed path
    let mut fresh = controller.subscribe();
    controller.start(&dir(&temp), QualityProfile::Normal).await?;
    let event = fresh.try_recv()?;
    assert!(event.output_path.is_some());
    Ok(())
}

#[tokio::test]
async fn test_rejected_command_emits_no_event() -> Result<()> {
    let (mut controller, _state, _temp) = new_controller(true);
    let mut events = controller.subscribe();

    assert!(controller.pause().await.is_err());
    assert!(controller.stop().await.is_err());

    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    Ok(())
}

#[test]
fn test_default_recording_name_is_minute_resolution() {
    use chrono::{Local, TimeZone};

    let when = Local.with_ymd_and_hms(2025, 10, 28, 9, 41, 37).unwrap();
    // Seconds are dropped by design; two starts in the same minute collide
    assert_eq!(
        audiolog::default_recording_name(when),
        "2025.10.28 09-41.wav"
    );
}
