use std::time::Duration;

use rollwatch_model::ProbeStatus;
use tokio::time::Instant;

/// What a single probe classification means for alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// UP after anything but UP: run the pipeline.
    WentLive,
    /// DOWN right after UP.
    WentDown,
    /// DOWN as the very first classification.
    FirstDown,
    /// Still DOWN and the last alert is older than the reminder delay.
    DownReminder,
    Unchanged,
}

/// Availability memory of the controller: the previous classification and
/// when the last DOWN alert went out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorState {
    last_status: Option<ProbeStatus>,
    last_down_alert: Option<Instant>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_status(&self) -> Option<ProbeStatus> {
        self.last_status
    }

    pub fn last_down_alert(&self) -> Option<Instant> {
        self.last_down_alert
    }

    /// Fold one classification into the state.
    pub fn record(&mut self, status: ProbeStatus, now: Instant, reminder_delay: Duration) -> Transition {
        let previous = self.last_status.replace(status);

        match (status, previous) {
            (ProbeStatus::Up, Some(ProbeStatus::Up)) => Transition::Unchanged,
            (ProbeStatus::Up, _) => Transition::WentLive,
            (ProbeStatus::Down, Some(ProbeStatus::Up)) => {
                self.last_down_alert = Some(now);
                Transition::WentDown
            }
            (ProbeStatus::Down, None) => {
                self.last_down_alert = Some(now);
                Transition::FirstDown
            }
            (ProbeStatus::Down, Some(ProbeStatus::Down)) => {
                let due = self
                    .last_down_alert
                    .is_none_or(|at| now.saturating_duration_since(at) > reminder_delay);
                if due {
                    self.last_down_alert = Some(now);
                    Transition::DownReminder
                } else {
                    Transition::Unchanged
                }
            }
        }
    }
}
