use std::time::Duration;

/// Fixed tick period while a session runs.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Armed/disarmed flag for the periodic tick.
///
/// The engine flips it; whoever drives `tick()` watches it. `arm_count`
/// grows on every fresh arm so a driver can tell a stop+start pair apart
/// from an uninterrupted run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ticker {
    armed: bool,
    arm_count: u64,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if it was already armed.
    pub fn arm(&mut self) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        self.arm_count += 1;
        true
    }

    /// Returns `false` if it was not armed.
    pub fn disarm(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn arm_count(&self) -> u64 {
        self.arm_count
    }
}
