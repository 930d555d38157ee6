//! Async front door to the timer engine.
//!
//! One tokio task owns the [`TimerEngine`]. Commands arrive over an mpsc
//! channel with a oneshot reply each and run to completion one at a time;
//! while the engine's ticker is armed the same task also fires `tick()` on a
//! fixed interval. Commands and ticks therefore never interleave.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::error::{CoreError, Result, ValidationError};
use crate::settings::{Settings, SettingsPatch};
use crate::timer::{SessionHistoryEntry, TimerEngine, TimerSnapshot, TICK_INTERVAL};

const COMMAND_BUFFER: usize = 64;

/// Commands understood by the driver task.
#[derive(Debug)]
pub enum TimerCommand {
    Status {
        reply: oneshot::Sender<TimerSnapshot>,
    },
    History {
        reply: oneshot::Sender<Vec<SessionHistoryEntry>>,
    },
    Start {
        reply: oneshot::Sender<TimerSnapshot>,
    },
    Stop {
        reply: oneshot::Sender<TimerSnapshot>,
    },
    Toggle {
        reply: oneshot::Sender<TimerSnapshot>,
    },
    Reset {
        reply: oneshot::Sender<TimerSnapshot>,
    },
    SetSessionType {
        session_type: String,
        reply: oneshot::Sender<Result<TimerSnapshot, ValidationError>>,
    },
    GetSettings {
        reply: oneshot::Sender<Settings>,
    },
    UpdateSettings {
        patch: SettingsPatch,
        reply: oneshot::Sender<Result<Settings, ValidationError>>,
    },
    ResetSettings {
        reply: oneshot::Sender<Settings>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

pub struct TimerDriver {
    engine: TimerEngine,
    commands: mpsc::Receiver<TimerCommand>,
    interval: Option<Interval>,
    /// `Ticker::arm_count` the current interval was created for.
    armed_generation: u64,
}

impl TimerDriver {
    pub fn new(engine: TimerEngine) -> (Self, TimerHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let driver = Self {
            engine,
            commands: rx,
            interval: None,
            armed_generation: 0,
        };
        (driver, TimerHandle { tx })
    }

    /// Spawn the driver on the current runtime. The join handle yields the
    /// engine back once the driver stops.
    pub fn spawn(engine: TimerEngine) -> (TimerHandle, JoinHandle<TimerEngine>) {
        let (driver, handle) = Self::new(engine);
        (handle, tokio::spawn(driver.run()))
    }

    pub async fn run(mut self) -> TimerEngine {
        tracing::debug!("timer driver started");
        loop {
            self.sync_interval();
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(TimerCommand::Shutdown { reply }) => {
                        let _ = reply.send(());
                        break;
                    }
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                _ = next_tick(&mut self.interval) => {
                    self.engine.tick();
                }
            }
        }
        self.engine.destroy();
        tracing::debug!("timer driver stopped");
        self.engine
    }

    /// Keep the interval in step with the engine's ticker. A fresh arm gets
    /// a fresh interval whose first tick is one full period away.
    fn sync_interval(&mut self) {
        let ticker = self.engine.ticker();
        if !ticker.is_armed() {
            self.interval = None;
            return;
        }
        if self.interval.is_none() || self.armed_generation != ticker.arm_count() {
            let mut interval = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.interval = Some(interval);
            self.armed_generation = ticker.arm_count();
        }
    }

    fn handle(&mut self, cmd: TimerCommand) {
        // A dropped reply receiver means the caller went away; the command
        // has already taken effect either way.
        match cmd {
            TimerCommand::Status { reply } => {
                let _ = reply.send(self.engine.get_state());
            }
            TimerCommand::History { reply } => {
                let _ = reply.send(self.engine.get_history());
            }
            TimerCommand::Start { reply } => {
                let _ = reply.send(self.engine.start());
            }
            TimerCommand::Stop { reply } => {
                let _ = reply.send(self.engine.stop());
            }
            TimerCommand::Toggle { reply } => {
                let _ = reply.send(self.engine.toggle());
            }
            TimerCommand::Reset { reply } => {
                let _ = reply.send(self.engine.reset());
            }
            TimerCommand::SetSessionType {
                session_type,
                reply,
            } => {
                let _ = reply.send(self.engine.set_session_type(&session_type));
            }
            TimerCommand::GetSettings { reply } => {
                let _ = reply.send(self.engine.settings().get_settings());
            }
            TimerCommand::UpdateSettings { patch, reply } => {
                let _ = reply.send(self.engine.update_settings(patch));
            }
            TimerCommand::ResetSettings { reply } => {
                let _ = reply.send(self.engine.reset_settings());
            }
            TimerCommand::Shutdown { reply } => {
                let _ = reply.send(());
            }
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Cloneable handle for talking to a running [`TimerDriver`].
#[derive(Debug, Clone)]
pub struct TimerHandle {
    tx: mpsc::Sender<TimerCommand>,
}

impl TimerHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> TimerCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| CoreError::DriverUnavailable)?;
        rx.await.map_err(|_| CoreError::DriverUnavailable)
    }

    pub async fn status(&self) -> Result<TimerSnapshot> {
        self.request(|reply| TimerCommand::Status { reply }).await
    }

    pub async fn history(&self) -> Result<Vec<SessionHistoryEntry>> {
        self.request(|reply| TimerCommand::History { reply }).await
    }

    pub async fn start(&self) -> Result<TimerSnapshot> {
        self.request(|reply| TimerCommand::Start { reply }).await
    }

    pub async fn stop(&self) -> Result<TimerSnapshot> {
        self.request(|reply| TimerCommand::Stop { reply }).await
    }

    pub async fn toggle(&self) -> Result<TimerSnapshot> {
        self.request(|reply| TimerCommand::Toggle { reply }).await
    }

    pub async fn reset(&self) -> Result<TimerSnapshot> {
        self.request(|reply| TimerCommand::Reset { reply }).await
    }

    pub async fn set_session_type(&self, session_type: impl Into<String>) -> Result<TimerSnapshot> {
        let session_type = session_type.into();
        Ok(self
            .request(|reply| TimerCommand::SetSessionType {
                session_type,
                reply,
            })
            .await??)
    }

    pub async fn settings(&self) -> Result<Settings> {
        self.request(|reply| TimerCommand::GetSettings { reply }).await
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<Settings> {
        Ok(self
            .request(|reply| TimerCommand::UpdateSettings { patch, reply })
            .await??)
    }

    pub async fn reset_settings(&self) -> Result<Settings> {
        self.request(|reply| TimerCommand::ResetSettings { reply }).await
    }

    /// Ask the driver to stop. Later requests fail with
    /// [`CoreError::DriverUnavailable`].
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| TimerCommand::Shutdown { reply }).await
    }
}
