//! One-shot delayed calls advanced by the simulation clock

/// Tolerance for accumulated float time (ms)
const EPSILON_MS: f64 = 1e-3;

/// A countdown that fires exactly once unless cancelled first
#[derive(Debug, Clone, PartialEq)]
pub struct DelayedCall {
    delay_ms: f64,
    elapsed_ms: f64,
    state: TimerState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Pending,
    Dispatched,
    Cancelled,
}

impl DelayedCall {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            elapsed_ms: 0.0,
            state: TimerState::Pending,
        }
    }

    /// Advance by `dt` seconds. Returns true on the single tick it fires.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.state != TimerState::Pending {
            return false;
        }
        self.elapsed_ms += dt as f64 * 1000.0;
        if self.elapsed_ms + EPSILON_MS >= self.delay_ms {
            self.state = TimerState::Dispatched;
            return true;
        }
        false
    }

    /// Stop the timer if it has not fired. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if self.state == TimerState::Pending {
            self.state = TimerState::Cancelled;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == TimerState::Pending
    }

    pub fn has_dispatched(&self) -> bool {
        self.state == TimerState::Dispatched
    }
}
