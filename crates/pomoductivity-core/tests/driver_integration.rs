//! Driver tests on a paused tokio clock.

use std::time::Duration;

use pomoductivity_core::settings::SettingsPatch;
use pomoductivity_core::{CoreError, TimerDriver, TimerEngine, ValidationError};
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn ticks_once_per_second_while_running() {
    let (handle, _task) = TimerDriver::spawn(TimerEngine::default());

    let started = handle.start().await.unwrap();
    assert!(started.state.is_running);

    sleep(Duration::from_millis(5_500)).await;
    let snap = handle.status().await.unwrap();
    assert_eq!(snap.state.time_remaining, 1495);
    assert!(snap.state.is_running);
}

#[tokio::test(start_paused = true)]
async fn idle_timer_does_not_tick() {
    let (handle, _task) = TimerDriver::spawn(TimerEngine::default());
    sleep(Duration::from_secs(10)).await;
    assert_eq!(handle.status().await.unwrap().state.time_remaining, 1500);
}

#[tokio::test(start_paused = true)]
async fn stop_disarms_and_start_rearms_a_full_period_later() {
    let (handle, _task) = TimerDriver::spawn(TimerEngine::default());

    handle.start().await.unwrap();
    sleep(Duration::from_millis(1_500)).await;
    let stopped = handle.stop().await.unwrap();
    assert_eq!(stopped.state.time_remaining, 1499);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(handle.status().await.unwrap().state.time_remaining, 1499);

    handle.start().await.unwrap();
    sleep(Duration::from_millis(900)).await;
    assert_eq!(handle.status().await.unwrap().state.time_remaining, 1499);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(handle.status().await.unwrap().state.time_remaining, 1498);
}

#[tokio::test(start_paused = true)]
async fn session_completes_and_ticker_stops() {
    let (handle, _task) = TimerDriver::spawn(TimerEngine::default());
    handle
        .update_settings(SettingsPatch {
            focus_duration: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();

    handle.start().await.unwrap();
    sleep(Duration::from_millis(3_500)).await;

    let snap = handle.status().await.unwrap();
    assert!(!snap.state.is_running);
    assert_eq!(snap.state.time_remaining, 3);
    assert_eq!(snap.state.session_count, 1);
    assert_eq!(handle.history().await.unwrap().len(), 1);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(handle.status().await.unwrap().state.time_remaining, 3);
}

#[tokio::test]
async fn validation_errors_come_back_as_core_errors() {
    let (handle, _task) = TimerDriver::spawn(TimerEngine::default());

    let err = handle.set_session_type("nap").await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::InvalidSessionType(ref s)) if s == "nap"
    ));

    let err = handle
        .update_settings(SettingsPatch {
            long_break_duration: Some(0),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(ValidationError::InvalidDuration { .. })));
    assert_eq!(handle.settings().await.unwrap().long_break_duration, 900);

    let err = handle.update_settings(SettingsPatch::default()).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(ValidationError::EmptyUpdate)));
}

#[tokio::test]
async fn shutdown_returns_engine_and_closes_handle() {
    let (handle, task) = TimerDriver::spawn(TimerEngine::default());
    handle.toggle().await.unwrap();

    handle.shutdown().await.unwrap();
    let engine = task.await.unwrap();
    assert!(!engine.ticker().is_armed());

    assert!(matches!(handle.status().await, Err(CoreError::DriverUnavailable)));
}
