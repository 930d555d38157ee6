//! Configurable session durations.
//!
//! The store hands out copies only. Updates are validated as a whole: one
//! bad field rejects the entire patch and nothing changes.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::notifier::{ChangeNotifier, SubscriberError, SubscriptionId};
use crate::timer::SessionType;

/// Default focus duration (25 minutes), in seconds.
pub const FOCUS_DURATION: u32 = 25 * 60;
/// Default short break duration (5 minutes), in seconds.
pub const SHORT_BREAK_DURATION: u32 = 5 * 60;
/// Default long break duration (15 minutes), in seconds.
pub const LONG_BREAK_DURATION: u32 = 15 * 60;
/// Upper bound for any duration (2 hours), in seconds.
pub const MAX_DURATION: u32 = 2 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub focus_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_duration: FOCUS_DURATION,
            short_break_duration: SHORT_BREAK_DURATION,
            long_break_duration: LONG_BREAK_DURATION,
        }
    }
}

impl Settings {
    pub fn duration(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Focus => self.focus_duration,
            SessionType::ShortBreak => self.short_break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }
}

/// Partial update. Absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_duration: Option<i64>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.focus_duration.is_none()
            && self.short_break_duration.is_none()
            && self.long_break_duration.is_none()
    }
}

/// True iff `value` lies in `1..=MAX_DURATION`.
pub fn is_valid_duration(value: i64) -> bool {
    (1..=i64::from(MAX_DURATION)).contains(&value)
}

fn checked(field: &'static str, value: Option<i64>) -> Result<Option<u32>, ValidationError> {
    match value {
        None => Ok(None),
        Some(v) if is_valid_duration(v) => Ok(u32::try_from(v).ok()),
        Some(v) => Err(ValidationError::InvalidDuration {
            field,
            value: v.to_string(),
        }),
    }
}

#[derive(Debug, Default)]
pub struct SettingsStore {
    settings: Settings,
    listeners: ChangeNotifier<Settings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_settings(&self) -> Settings {
        self.settings
    }

    /// Validate every present field, then merge. Listeners see the merged
    /// snapshot only when the whole patch is accepted. A patch with no
    /// fields is rejected with [`ValidationError::EmptyUpdate`].
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<Settings, ValidationError> {
        if patch.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        let focus = checked("focusDuration", patch.focus_duration)?;
        let short = checked("shortBreakDuration", patch.short_break_duration)?;
        let long = checked("longBreakDuration", patch.long_break_duration)?;

        if let Some(v) = focus {
            self.settings.focus_duration = v;
        }
        if let Some(v) = short {
            self.settings.short_break_duration = v;
        }
        if let Some(v) = long {
            self.settings.long_break_duration = v;
        }

        self.listeners.notify(&self.settings);
        tracing::info!(settings = ?self.settings, "settings updated");
        Ok(self.settings)
    }

    pub fn reset_settings(&mut self) -> Settings {
        self.settings = Settings::default();
        self.listeners.notify(&self.settings);
        tracing::info!("settings reset to defaults");
        self.settings
    }

    pub fn get_duration(&self, session_type: SessionType) -> u32 {
        self.settings.duration(session_type)
    }

    /// Lookup by wire name. Unknown names fall back to the focus duration.
    pub fn get_duration_by_name(&self, name: &str) -> u32 {
        name.parse::<SessionType>()
            .map(|t| self.get_duration(t))
            .unwrap_or(self.settings.focus_duration)
    }

    pub fn on_change<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&Settings) -> Result<(), SubscriberError> + Send + 'static,
    {
        self.listeners.subscribe(callback)
    }

    pub fn remove_listener(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}
