use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use super::state::RecorderState;
use super::timer::RecordingTimeTracker;
use crate::capture::{CaptureDevice, DeviceError, QualityProfile, RECORDING_FILE_EXT};

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Session command errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The command is not legal in the current state. The state is unchanged.
    #[error("{command} is not valid while {state}")]
    InvalidTransition {
        state: RecorderState,
        command: &'static str,
    },

    /// The capture device cannot pause/resume mid-stream. State unchanged.
    #[error("pause/resume not supported by capture device {device}")]
    CapabilityUnsupported { device: String },

    /// Starting the session failed; the device was reset and the controller
    /// stayed stopped. The underlying cause is classified in `DeviceError`.
    #[error("recording start failed: {0}")]
    StartFailed(#[source] DeviceError),

    /// The device failed mid-session; the controller reset it and dropped
    /// back to stopped.
    #[error("capture device failure: {0}")]
    Device(#[source] DeviceError),
}

/// State-change event delivered to subscribers, at most once per transition.
#[derive(Debug, Clone)]
pub struct StateChange {
    pub state: RecorderState,
    pub output_path: Option<PathBuf>,
}

/// Default recording filename: current local time down to the minute plus the
/// fixed capture extension. Two starts within the same minute target the same
/// file; that race is a documented limitation, not handled here.
pub fn default_recording_name(now: DateTime<Local>) -> String {
    format!("{}.{}", now.format("%Y.%m.%d %H-%M"), RECORDING_FILE_EXT)
}

/// Drives the capture device through the recording state machine and keeps
/// the elapsed-time accounting honest across pauses.
///
/// Single-writer: commands must not interleave mid-transition, so callers
/// hold the one controller instance behind `Arc<tokio::sync::Mutex<_>>`.
/// Events are sent on a broadcast channel whose `send` never blocks, so
/// subscribers only run after the caller has released that lock and can
/// immediately issue a follow-up command without deadlocking.
pub struct RecordingController {
    device: Box<dyn CaptureDevice>,
    tracker: RecordingTimeTracker,
    state: RecorderState,
    output_path: Option<PathBuf>,
    events: broadcast::Sender<StateChange>,
}

impl RecordingController {
    pub fn new(device: Box<dyn CaptureDevice>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            device,
            tracker: RecordingTimeTracker::new(),
            state: RecorderState::Stopped,
            output_path: None,
            events,
        }
    }

    /// Subscribe to state-change events. Each successful command (or device
    /// fault that changed the state) produces exactly one event; rejected
    /// no-op commands produce none.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.events.subscribe()
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Elapsed active recording time of the in-flight session.
    pub fn elapsed(&self) -> Duration {
        if self.state.is_active() {
            self.tracker.elapsed_active(Instant::now())
        } else {
            Duration::ZERO
        }
    }

    /// Start a new recording session into `output_dir` using the given
    /// quality profile. Returns the committed output path.
    pub async fn start(
        &mut self,
        output_dir: &Path,
        profile: QualityProfile,
    ) -> Result<PathBuf, SessionError> {
        if self.state != RecorderState::Stopped {
            return Err(self.rejected("start"));
        }

        std::fs::create_dir_all(output_dir)
            .map_err(|e| SessionError::StartFailed(DeviceError::classify_io(e)))?;
        let path = output_dir.join(default_recording_name(Local::now()));
        info!("starting recording to {}", path.display());

        let settings = profile.settings(path.clone());
        if let Err(e) = self.device.configure(&settings) {
            self.device.reset();
            return Err(SessionError::StartFailed(e));
        }
        if let Err(e) = self.device.start().await {
            error!("capture device failed to start: {}", e);
            self.device.reset();
            return Err(SessionError::StartFailed(e));
        }

        self.tracker.start(Instant::now());
        self.state = RecorderState::Recording;
        self.output_path = Some(path.clone());
        self.emit(Some(path.clone()));
        Ok(path)
    }

    /// Pause the in-flight recording. Legal while recording or resumed, and
    /// only on devices supporting mid-stream pause.
    pub async fn pause(&mut self) -> Result<(), SessionError> {
        if !self.state.is_capturing() {
            return Err(self.rejected("pause"));
        }
        if !self.device.supports_pause() {
            return Err(SessionError::CapabilityUnsupported {
                device: self.device.name().to_string(),
            });
        }

        if let Err(e) = self.device.pause().await {
            return Err(self.fault(e));
        }
        self.tracker.mark_pause_begin(Instant::now());
        self.state = RecorderState::Paused;
        self.emit(self.output_path.clone());
        Ok(())
    }

    /// Resume a paused recording.
    pub async fn resume(&mut self) -> Result<(), SessionError> {
        if self.state != RecorderState::Paused {
            return Err(self.rejected("resume"));
        }
        if !self.device.supports_pause() {
            return Err(SessionError::CapabilityUnsupported {
                device: self.device.name().to_string(),
            });
        }

        if let Err(e) = self.device.resume().await {
            return Err(self.fault(e));
        }
        self.tracker.mark_pause_end(Instant::now());
        self.state = RecorderState::Resumed;
        self.emit(self.output_path.clone());
        Ok(())
    }

    /// Stop the session and finalize the output file. Returns the finished
    /// recording path.
    pub async fn stop(&mut self) -> Result<PathBuf, SessionError> {
        if !self.state.is_active() {
            return Err(self.rejected("stop"));
        }

        // A stop error still ends the session: log it and reset the device
        // so the controller is never left in an ambiguous state.
        if let Err(e) = self.device.stop().await {
            warn!("capture device error while stopping: {}", e);
        }
        self.device.reset();
        self.tracker.reset();
        self.state = RecorderState::Stopped;

        match self.output_path.take() {
            Some(finished) => {
                info!("recording stopped: {}", finished.display());
                self.emit(Some(finished.clone()));
                Ok(finished)
            }
            None => {
                // Active state always carries an output path; reaching here
                // means the session bookkeeping was corrupted.
                self.emit(None);
                Err(SessionError::Device(DeviceError::IllegalState(
                    "active session had no output path",
                )))
            }
        }
    }

    fn rejected(&self, command: &'static str) -> SessionError {
        warn!("rejected {} while {}", command, self.state);
        SessionError::InvalidTransition {
            state: self.state,
            command,
        }
    }

    /// Fatal device error path: reset everything to a known-good stopped
    /// state before surfacing the error. The partial output file is kept on
    /// disk best-effort, but the session no longer tracks it.
    fn fault(&mut self, cause: DeviceError) -> SessionError {
        error!("capture device fault, resetting to stopped: {}", cause);
        self.device.reset();
        self.tracker.reset();
        self.state = RecorderState::Stopped;
        self.output_path = None;
        self.emit(None);
        SessionError::Device(cause)
    }

    fn emit(&self, output_path: Option<PathBuf>) {
        // send only fails with no subscribers, which is fine
        let _ = self.events.send(StateChange {
            state: self.state,
            output_path,
        });
    }
}
