use std::time::{Duration, Instant};
use tracing::warn;

/// Pure accounting of active recording time across pause/resume cycles.
///
/// All instants come from the caller and must be monotonic (`Instant`), so a
/// wall-clock adjustment mid-recording cannot corrupt the elapsed figure.
/// Mis-ordered calls are defensive no-ops and are logged, never panics.
#[derive(Debug, Default)]
pub struct RecordingTimeTracker {
    started_at: Option<Instant>,
    pause_began_at: Option<Instant>,
    paused_total: Duration,
}

impl RecordingTimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the session start instant and clear accumulated pause time.
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.pause_began_at = None;
        self.paused_total = Duration::ZERO;
    }

    /// Open a pause interval.
    pub fn mark_pause_begin(&mut self, now: Instant) {
        if self.started_at.is_none() {
            warn!("pause marked before the tracker was started, ignoring");
            return;
        }
        if self.pause_began_at.is_some() {
            warn!("pause marked while a pause interval is already open, ignoring");
            return;
        }
        self.pause_began_at = Some(now);
    }

    /// Close the open pause interval, adding it to the accumulated total.
    pub fn mark_pause_end(&mut self, now: Instant) {
        match self.pause_began_at.take() {
            Some(began) => {
                self.paused_total += now.saturating_duration_since(began);
            }
            None => warn!("pause end marked with no open pause interval, ignoring"),
        }
    }

    /// Elapsed active recording time: wall time since start minus all pause
    /// time, including a still-open pause interval. Zero before start.
    pub fn elapsed_active(&self, now: Instant) -> Duration {
        let Some(started) = self.started_at else {
            return Duration::ZERO;
        };

        let wall = now.saturating_duration_since(started);
        let open_pause = self
            .pause_began_at
            .map(|began| now.saturating_duration_since(began))
            .unwrap_or(Duration::ZERO);

        wall.checked_sub(self.paused_total)
            .and_then(|d| d.checked_sub(open_pause))
            .unwrap_or(Duration::ZERO)
    }

    /// Clear all fields back to the pre-start state.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.pause_began_at = None;
        self.paused_total = Duration::ZERO;
    }
}
