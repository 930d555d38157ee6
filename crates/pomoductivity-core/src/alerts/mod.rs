//! Outbound alerts for timer transitions.
//!
//! The engine calls [`AlertDispatcher::dispatch`] from its synchronous
//! command path. Delivery runs on detached tokio tasks, one per sink, and
//! failures end in a log line. Nothing is retried and nothing flows back
//! into the timer.

mod pushover;

pub use pushover::{PushoverSink, PUSHOVER_ENDPOINT};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveTime};
use serde::Serialize;

use crate::error::AlertError;
use crate::events::TimerEvent;
use crate::timer::SessionType;

/// A formatted, ready-to-send alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    /// Build the alert text for `event`, stamped with `time_of_day`.
    pub fn new(
        event: TimerEvent,
        session_type: SessionType,
        duration_minutes: f64,
        time_of_day: NaiveTime,
    ) -> Self {
        let label = session_type.label();
        Self {
            title: format!("Timer Event: {label}"),
            message: format!(
                "{label} session {} at {} for {duration_minutes} minutes.",
                event.action(),
                time_of_day.format("%-I:%M:%S %p"),
            ),
        }
    }
}

/// A destination for alerts (push service, chat webhook, ...).
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    async fn send(&self, alert: &Alert) -> Result<(), AlertError>;
}

#[derive(Clone, Default)]
pub struct AlertDispatcher {
    sinks: Vec<Arc<dyn AlertSink>>,
}

impl AlertDispatcher {
    /// A dispatcher with no sinks; every dispatch is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn add_sink(&mut self, sink: Arc<dyn AlertSink>) {
        tracing::debug!(sink = sink.name(), "alert sink registered");
        self.sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Format and fire the alert. Returns the number of delivery tasks
    /// spawned; never blocks on the network.
    pub fn dispatch(&self, event: TimerEvent, session_type: SessionType, duration_minutes: f64) -> usize {
        if self.sinks.is_empty() {
            return 0;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!(?event, "no async runtime, alert skipped");
            return 0;
        };

        let alert = Arc::new(Alert::new(
            event,
            session_type,
            duration_minutes,
            Local::now().time(),
        ));
        for sink in &self.sinks {
            let sink = Arc::clone(sink);
            let alert = Arc::clone(&alert);
            runtime.spawn(async move {
                match sink.send(&alert).await {
                    Ok(()) => tracing::debug!(sink = sink.name(), title = %alert.title, "alert delivered"),
                    Err(e) => tracing::warn!(sink = sink.name(), error = %e, "failed to deliver alert"),
                }
            });
        }
        self.sinks.len()
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.sinks.iter().map(|s| s.name()).collect();
        f.debug_struct("AlertDispatcher").field("sinks", &names).finish()
    }
}
