//! # Pomoductivity Core Library
//!
//! This library provides the business logic behind the Pomoductivity server:
//! a single shared Pomodoro countdown whose every state change is fanned out
//! to subscribers (WebSocket broadcast, push alerts).
//!
//! ## Architecture
//!
//! - **Settings Store**: the three configurable session durations, validated
//!   all-or-nothing
//! - **Timer Engine**: the state machine; it never sleeps or spawns a timer
//!   itself, the caller drives `tick()` on a fixed period
//! - **Change Notifier**: ordered observer registry with per-subscriber fault
//!   isolation
//! - **Alert Dispatcher**: fire-and-forget delivery of human-readable alerts
//!   to external sinks (Pushover)
//! - **Timer Driver**: the tokio task that owns the engine, serializes
//!   commands and drives the one-second tick while the timer runs
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SettingsStore`]: Duration settings with change notification
//! - [`ChangeNotifier`]: Subscriber registry
//! - [`AlertDispatcher`]: Outbound alert fan-out
//! - [`TimerDriver`] / [`TimerHandle`]: Async front door to the engine
//! - [`Config`]: Server and alert configuration

pub mod alerts;
pub mod config;
pub mod driver;
pub mod error;
pub mod events;
pub mod notifier;
pub mod settings;
pub mod timer;

pub use alerts::{Alert, AlertDispatcher, AlertSink, PushoverSink};
pub use config::Config;
pub use driver::{TimerCommand, TimerDriver, TimerHandle};
pub use error::{AlertError, ConfigError, CoreError, ValidationError};
pub use events::TimerEvent;
pub use notifier::{ChangeNotifier, SubscriberError, SubscriptionId};
pub use settings::{Settings, SettingsPatch, SettingsStore};
pub use timer::{SessionHistoryEntry, SessionStatus, SessionType, TimerEngine, TimerSnapshot};
