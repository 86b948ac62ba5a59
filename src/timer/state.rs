use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    Idle,
    Running,
}

impl Default for TimerStatus {
    fn default() -> Self {
        TimerStatus::Idle
    }
}

/// Snapshot of one countdown session.
///
/// `remaining_secs` never exceeds `total_secs`, and `elapsed_secs` is always
/// `total_secs - remaining_secs`. Durations are whole seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub session_id: Option<String>,
    pub total_secs: u64,
    pub remaining_secs: u64,
    pub elapsed_secs: u64,
    pub started_at: Option<DateTime<Utc>>,
}

impl TimerState {
    pub fn new(total_secs: u64) -> Self {
        Self {
            status: TimerStatus::Idle,
            session_id: None,
            total_secs,
            remaining_secs: total_secs,
            elapsed_secs: 0,
            started_at: None,
        }
    }

    /// Remaining time split into whole minutes and leftover seconds.
    pub fn clock(&self) -> (u64, u64) {
        (self.remaining_secs / 60, self.remaining_secs % 60)
    }

    pub fn begin_session(&mut self, session_id: String, started_at: DateTime<Utc>) {
        self.status = TimerStatus::Running;
        self.session_id = Some(session_id);
        self.started_at = Some(started_at);
    }

    /// One second has elapsed.
    pub fn tick_down(&mut self) {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.elapsed_secs = self.total_secs - self.remaining_secs;
    }

    /// Leave the running state, keeping the countdown position.
    pub fn halt(&mut self) {
        self.status = TimerStatus::Idle;
        self.elapsed_secs = self.total_secs - self.remaining_secs;
    }

    /// Return to idle at the full duration. `new_total` replaces the
    /// configured duration when present.
    pub fn rewind(&mut self, new_total: Option<u64>) {
        self.status = TimerStatus::Idle;
        if let Some(total) = new_total {
            self.total_secs = total;
        }
        self.remaining_secs = self.total_secs;
        self.elapsed_secs = 0;
        self.session_id = None;
        self.started_at = None;
    }
}
