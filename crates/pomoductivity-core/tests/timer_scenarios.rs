//! End-to-end scenarios against the timer engine.
//!
//! These drive `tick()` by hand, the way the driver does once per second.

use pomoductivity_core::settings::{is_valid_duration, Settings, SettingsPatch, SettingsStore};
use pomoductivity_core::timer::{SessionStatus, SessionType, TimerEngine};
use pomoductivity_core::{AlertDispatcher, ValidationError};
use proptest::prelude::*;

fn fresh_engine() -> TimerEngine {
    TimerEngine::new(SettingsStore::new(), AlertDispatcher::new())
}

#[test]
fn five_ticks_after_start() {
    let mut engine = fresh_engine();
    engine.start();
    for _ in 0..5 {
        engine.tick();
    }
    let snap = engine.get_state();
    assert_eq!(snap.state.time_remaining, 1495);
    assert!(snap.state.is_running);
}

#[test]
fn switching_to_short_break() {
    let mut engine = fresh_engine();
    let snap = engine.set_session_type("short_break").unwrap();
    assert_eq!(snap.state.time_remaining, 300);
    assert_eq!(snap.state.session_type, SessionType::ShortBreak);
    assert!(!snap.state.is_running);
}

#[test]
fn full_focus_session_completes() {
    let mut engine = fresh_engine();
    engine.start();
    for _ in 0..1500 {
        engine.tick();
    }

    let snap = engine.get_state();
    assert_eq!(snap.history.len(), 1);
    let entry = &snap.history[0];
    assert_eq!(entry.session_type, SessionType::Focus);
    assert_eq!(entry.duration, 1500);
    assert_eq!(entry.status, SessionStatus::Completed);
    assert!(entry.start_time.is_some_and(|start| start <= entry.end_time));

    assert_eq!(snap.state.session_count, 1);
    assert!(!snap.state.is_running);
    assert_eq!(snap.state.time_remaining, 1500);
    assert!(snap.state.start_time.is_none());
    assert!(!engine.ticker().is_armed());
}

#[test]
fn extra_ticks_after_completion_change_nothing() {
    let mut engine = fresh_engine();
    engine.start();
    for _ in 0..1500 {
        engine.tick();
    }
    let after = engine.get_state();
    for _ in 0..10 {
        assert!(engine.tick().is_none());
    }
    assert_eq!(engine.get_state(), after);
}

#[test]
fn over_max_duration_is_rejected() {
    let mut engine = fresh_engine();
    let err = engine
        .update_settings(SettingsPatch {
            focus_duration: Some(7201),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidDuration { field: "focusDuration", .. }));
    assert_eq!(engine.settings().get_settings(), Settings::default());
    assert_eq!(engine.state().time_remaining, 1500);
}

#[test]
fn history_accumulates_in_order() {
    let mut engine = fresh_engine();
    engine
        .update_settings(SettingsPatch {
            focus_duration: Some(2),
            short_break_duration: Some(1),
            long_break_duration: Some(3),
        })
        .unwrap();

    for (raw, ticks) in [("focus", 2), ("short_break", 1), ("focus", 2), ("long_break", 3)] {
        engine.set_session_type(raw).unwrap();
        engine.start();
        for _ in 0..ticks {
            engine.tick();
        }
    }

    let kinds: Vec<SessionType> = engine.get_history().iter().map(|e| e.session_type).collect();
    assert_eq!(
        kinds,
        vec![
            SessionType::Focus,
            SessionType::ShortBreak,
            SessionType::Focus,
            SessionType::LongBreak
        ]
    );
    assert_eq!(engine.state().session_count, 2);
}

#[test]
fn returned_history_is_a_copy() {
    let mut engine = fresh_engine();
    engine
        .update_settings(SettingsPatch {
            focus_duration: Some(1),
            ..Default::default()
        })
        .unwrap();
    engine.start();
    engine.tick();

    let mut copy = engine.get_history();
    copy.clear();
    assert_eq!(engine.get_history().len(), 1);
}

proptest! {
    #[test]
    fn duration_validity_matches_range(v in any::<i64>()) {
        prop_assert_eq!(is_valid_duration(v), (1..=7200).contains(&v));
    }

    #[test]
    fn multi_field_update_is_all_or_nothing(
        focus in -10i64..8000,
        short in -10i64..8000,
        long in -10i64..8000,
    ) {
        let mut store = SettingsStore::new();
        let before = store.get_settings();
        let result = store.update_settings(SettingsPatch {
            focus_duration: Some(focus),
            short_break_duration: Some(short),
            long_break_duration: Some(long),
        });
        let all_valid = [focus, short, long].into_iter().all(is_valid_duration);
        if all_valid {
            let after = result.unwrap();
            prop_assert_eq!(i64::from(after.focus_duration), focus);
            prop_assert_eq!(i64::from(after.short_break_duration), short);
            prop_assert_eq!(i64::from(after.long_break_duration), long);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(store.get_settings(), before);
        }
    }

    #[test]
    fn reset_always_restores_defaults(focus in 1i64..=7200, short in 1i64..=7200) {
        let mut store = SettingsStore::new();
        store.update_settings(SettingsPatch {
            focus_duration: Some(focus),
            short_break_duration: Some(short),
            long_break_duration: None,
        }).unwrap();
        let reset = store.reset_settings();
        prop_assert_eq!(reset.focus_duration, 1500);
        prop_assert_eq!(reset.short_break_duration, 300);
        prop_assert_eq!(reset.long_break_duration, 900);
    }
}
