//! Recording session management
//!
//! This module provides the recording session state machine:
//! - `RecordingController`: drives the capture device through
//!   stopped/recording/paused/resumed and publishes state-change events
//! - `RecordingTimeTracker`: elapsed-time accounting across pause cycles
//! - `RecorderState`: the state enum shared with subscribers

mod controller;
mod state;
mod timer;

pub use controller::{default_recording_name, RecordingController, SessionError, StateChange};
pub use state::RecorderState;
pub use timer::RecordingTimeTracker;
