use serde::{Deserialize, Serialize};

/// Timer transitions that produce an outbound alert.
///
/// Plain state changes (ticks, resets, type switches) reach subscribers as
/// snapshots only; these three additionally go to the alert sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    #[serde(rename = "timerStarted")]
    Started,
    #[serde(rename = "timerStopped")]
    Stopped,
    #[serde(rename = "timerCompleted")]
    Completed,
}

impl TimerEvent {
    /// Verb used in alert messages.
    pub fn action(self) -> &'static str {
        match self {
            TimerEvent::Started => "started",
            TimerEvent::Stopped => "stopped",
            TimerEvent::Completed => "completed",
        }
    }
}
