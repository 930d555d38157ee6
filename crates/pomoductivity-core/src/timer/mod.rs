mod engine;
mod session;
mod ticker;

pub use engine::{TimerEngine, TimerSnapshot, TimerState};
pub use session::{SessionHistoryEntry, SessionStatus, SessionType};
pub use ticker::{Ticker, TICK_INTERVAL};
