//! Timer engine implementation.
//!
//! The engine owns the single shared countdown, its session history and the
//! settings it counts against. It does not use internal threads -- the
//! caller is responsible for calling `tick()` once per [`TICK_INTERVAL`]
//! while [`Ticker::is_armed`] holds. Commands and ticks must not overlap;
//! `&mut self` enforces that.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --stop--> Idle
//!                 Running --tick to 0--> Idle (history += completed)
//! any  --reset / set_session_type--> Idle (full duration)
//! ```
//!
//! Every observable change is pushed to the state listeners as a
//! [`TimerSnapshot`]. Start, stop and completion also fire an alert.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SettingsStore::new(), AlertDispatcher::new());
//! engine.start();
//! // Once per second while engine.ticker().is_armed():
//! engine.tick();
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::{SessionHistoryEntry, SessionStatus, SessionType};
use super::ticker::Ticker;
use crate::alerts::AlertDispatcher;
use crate::error::ValidationError;
use crate::events::TimerEvent;
use crate::notifier::{ChangeNotifier, SubscriberError, SubscriptionId};
use crate::settings::{Settings, SettingsPatch, SettingsStore};

/// Live countdown state, without history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub is_running: bool,
    /// Seconds left in the current session.
    pub time_remaining: u32,
    pub session_type: SessionType,
    /// Completed focus sessions.
    pub session_count: u32,
    /// Set while running, `None` otherwise.
    pub start_time: Option<DateTime<Utc>>,
}

/// What callers and subscribers see: the state plus the full history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    #[serde(flatten)]
    pub state: TimerState,
    pub history: Vec<SessionHistoryEntry>,
}

pub struct TimerEngine {
    state: TimerState,
    history: Vec<SessionHistoryEntry>,
    settings: SettingsStore,
    ticker: Ticker,
    listeners: ChangeNotifier<TimerSnapshot>,
    alerts: AlertDispatcher,
}

impl TimerEngine {
    /// Create an idle focus session at the store's focus duration.
    pub fn new(settings: SettingsStore, alerts: AlertDispatcher) -> Self {
        let state = TimerState {
            is_running: false,
            time_remaining: settings.get_duration(SessionType::Focus),
            session_type: SessionType::Focus,
            session_count: 0,
            start_time: None,
        };
        Self {
            state,
            history: Vec::new(),
            settings,
            ticker: Ticker::new(),
            listeners: ChangeNotifier::new(),
            alerts,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Full snapshot, history included.
    pub fn get_state(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state.clone(),
            history: self.history.clone(),
        }
    }

    pub fn get_history(&self) -> Vec<SessionHistoryEntry> {
        self.history.clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn on_state_change<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&TimerSnapshot) -> Result<(), SubscriberError> + Send + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn remove_listener(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> TimerSnapshot {
        if self.state.is_running {
            return self.get_state();
        }
        self.state.is_running = true;
        self.state.start_time = Some(Utc::now());
        self.ticker.arm();

        self.notify_state_change();
        self.alert(TimerEvent::Started);
        tracing::info!(session_type = %self.state.session_type, remaining = self.state.time_remaining, "timer started");
        self.get_state()
    }

    pub fn stop(&mut self) -> TimerSnapshot {
        if !self.state.is_running {
            return self.get_state();
        }
        self.state.is_running = false;
        self.state.start_time = None;
        self.ticker.disarm();

        self.notify_state_change();
        self.alert(TimerEvent::Stopped);
        tracing::info!(remaining = self.state.time_remaining, "timer stopped");
        self.get_state()
    }

    pub fn toggle(&mut self) -> TimerSnapshot {
        if self.state.is_running {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Back to the full duration of the current session type. History and
    /// the session count are untouched.
    pub fn reset(&mut self) -> TimerSnapshot {
        self.ticker.disarm();
        self.state.is_running = false;
        self.state.time_remaining = self.settings.get_duration(self.state.session_type);
        self.state.start_time = None;

        self.notify_state_change();
        tracing::info!("timer reset");
        self.get_state()
    }

    /// Switch to `requested` (`focus`, `short_break`, `long_break`) and
    /// load its full duration, idle.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSessionType`] for any other value;
    /// nothing is mutated and no listener fires.
    pub fn set_session_type(&mut self, requested: &str) -> Result<TimerSnapshot, ValidationError> {
        let session_type: SessionType = requested.parse()?;

        self.ticker.disarm();
        self.state.session_type = session_type;
        self.state.time_remaining = self.settings.get_duration(session_type);
        self.state.is_running = false;
        self.state.start_time = None;

        self.notify_state_change();
        tracing::info!(%session_type, "session type changed");
        Ok(self.get_state())
    }

    /// Advance the countdown by one second. Returns
    /// `Some(TimerEvent::Completed)` when this tick finished the session.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.state.is_running || self.state.time_remaining == 0 {
            return None;
        }
        self.state.time_remaining -= 1;
        self.notify_state_change();

        if self.state.time_remaining == 0 {
            self.complete_session();
            return Some(TimerEvent::Completed);
        }
        None
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Apply a settings patch, then resync an untouched idle countdown.
    ///
    /// Settings listeners run inside the store update, so they always see
    /// the new values before the resynced timer snapshot goes out.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<Settings, ValidationError> {
        let previous = self.settings.get_settings();
        let current = self.settings.update_settings(patch)?;
        self.handle_settings_change(&previous, &current);
        Ok(current)
    }

    pub fn reset_settings(&mut self) -> Settings {
        let previous = self.settings.get_settings();
        let current = self.settings.reset_settings();
        self.handle_settings_change(&previous, &current);
        current
    }

    /// Subscribe to accepted settings changes.
    pub fn on_settings_change<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&Settings) -> Result<(), SubscriberError> + Send + 'static,
    {
        self.settings.on_change(callback)
    }

    /// Drop every listener and stop ticking.
    pub fn destroy(&mut self) {
        self.ticker.disarm();
        self.listeners.destroy();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_session(&mut self) {
        let session_type = self.state.session_type;
        let duration = self.settings.get_duration(session_type);

        self.history.push(SessionHistoryEntry {
            session_type,
            start_time: self.state.start_time,
            end_time: Utc::now(),
            duration,
            status: SessionStatus::Completed,
        });

        self.state.is_running = false;
        if session_type == SessionType::Focus {
            self.state.session_count += 1;
        }
        // Stay on the same session type; the client picks the next one.
        self.state.time_remaining = duration;
        self.state.start_time = None;
        self.ticker.disarm();

        self.notify_state_change();
        self.alert(TimerEvent::Completed);
        tracing::info!(%session_type, count = self.state.session_count, "session completed");
    }

    /// Only an idle countdown still sitting at the old full duration follows
    /// the new value; a consumed or running countdown is left alone.
    fn handle_settings_change(&mut self, previous: &Settings, current: &Settings) {
        if self.state.is_running {
            return;
        }
        let session_type = self.state.session_type;
        let old_full = previous.duration(session_type);
        let new_full = current.duration(session_type);
        if self.state.time_remaining == old_full && old_full != new_full {
            self.state.time_remaining = new_full;
            self.notify_state_change();
        }
    }

    fn notify_state_change(&self) {
        if self.listeners.is_empty() {
            return;
        }
        self.listeners.notify(&self.get_state());
    }

    fn alert(&self, event: TimerEvent) {
        let session_type = self.state.session_type;
        let minutes = f64::from(self.settings.get_duration(session_type)) / 60.0;
        self.alerts.dispatch(event, session_type, minutes);
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(SettingsStore::new(), AlertDispatcher::new())
    }
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("history_len", &self.history.len())
            .field("ticker", &self.ticker)
            .field("listeners", &self.listeners)
            .field("alerts", &self.alerts)
            .finish()
    }
}
