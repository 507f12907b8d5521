use std::fmt;

/// Recorder state machine states.
///
/// `Resumed` is functionally recording; it exists as a distinct state so
/// subscribers can tell a fresh start from a resume after pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Stopped,
    Recording,
    Paused,
    Resumed,
}

impl RecorderState {
    /// Whether a session is in flight (recording or paused).
    pub fn is_active(self) -> bool {
        !matches!(self, RecorderState::Stopped)
    }

    /// Whether audio is actually being captured right now.
    pub fn is_capturing(self) -> bool {
        matches!(self, RecorderState::Recording | RecorderState::Resumed)
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecorderState::Stopped => "stopped",
            RecorderState::Recording => "recording",
            RecorderState::Paused => "paused",
            RecorderState::Resumed => "resumed",
        };
        f.write_str(name)
    }
}
