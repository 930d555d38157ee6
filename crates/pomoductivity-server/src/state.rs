//! Shared application state and process wiring.

use std::sync::Arc;
use std::time::Instant;

use pomoductivity_core::config::AlertsConfig;
use pomoductivity_core::{AlertDispatcher, PushoverSink, SettingsStore, TimerDriver, TimerEngine, TimerHandle};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Snapshots buffered per WebSocket client before it starts skipping.
const UPDATE_BUFFER: usize = 64;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub timer: TimerHandle,
    /// Serialized snapshots for WebSocket clients.
    pub updates: broadcast::Sender<String>,
    pub started_at: Instant,
}

/// Build the engine, hook up the WebSocket fan-out and spawn the driver.
///
/// Must be called from within a tokio runtime.
pub fn start(alerts: &AlertsConfig) -> (AppState, JoinHandle<TimerEngine>) {
    let mut engine = TimerEngine::new(SettingsStore::new(), build_alerts(alerts));

    let (updates, _) = broadcast::channel(UPDATE_BUFFER);
    let tx = updates.clone();
    engine.on_state_change(move |snapshot| {
        let json = serde_json::to_string(snapshot)?;
        // Err only means nobody is connected right now.
        let _ = tx.send(json);
        Ok(())
    });

    let (timer, driver) = TimerDriver::spawn(engine);
    let state = AppState {
        timer,
        updates,
        started_at: Instant::now(),
    };
    (state, driver)
}

fn build_alerts(config: &AlertsConfig) -> AlertDispatcher {
    let mut dispatcher = AlertDispatcher::new();
    if !config.enabled {
        info!("push alerts disabled");
        return dispatcher;
    }
    match PushoverSink::from_config(config) {
        Ok(sink) => {
            info!(endpoint = sink.endpoint(), "pushover alerts enabled");
            dispatcher.add_sink(Arc::new(sink));
        }
        Err(e) => warn!(error = %e, "pushover alerts unavailable"),
    }
    dispatcher
}
