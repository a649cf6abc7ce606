//! Per-side wall-clock time control.
//!
//! The clock is purely passive: there is no background timer. Elapsed
//! time is charged to the mover when a move is applied, and a flag fall
//! is only ever observed at that moment. A player whose time has
//! already run out but who never moves again simply loses on their next
//! move attempt (or resigns / abandons first).

use std::time::{Duration, Instant};

use parlor_protocol::{ClockSnapshot, Side};

/// Wall-clock time budgets for both sides of an active session.
#[derive(Debug, Clone)]
pub struct TurnClock {
    /// Remaining budget per side, indexed by [`Side::index`].
    remaining: [Duration; 2],
    /// When the previous move was applied (or the game started).
    last_move_at: Instant,
}

impl TurnClock {
    /// Starts a clock with the given budget on both sides. The first
    /// mover's time starts running immediately.
    pub fn start(budget: Duration) -> Self {
        Self {
            remaining: [budget, budget],
            last_move_at: Instant::now(),
        }
    }

    /// Charges the wall-clock time since the previous move to `side`
    /// and returns that side's remaining budget.
    ///
    /// Saturates at zero — a flagged side reports exactly
    /// `Duration::ZERO`, never underflows.
    pub fn record_move(&mut self, side: Side) -> Duration {
        let now = Instant::now();
        let spent = now.duration_since(self.last_move_at);
        let left = self.remaining[side.index()].saturating_sub(spent);
        self.remaining[side.index()] = left;
        self.last_move_at = now;
        left
    }

    /// Remaining budget for one side.
    pub fn remaining(&self, side: Side) -> Duration {
        self.remaining[side.index()]
    }

    /// The wire representation, in milliseconds.
    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            white_ms: self.remaining[Side::White.index()].as_millis() as u64,
            black_ms: self.remaining[Side::Black.index()].as_millis() as u64,
        }
    }
}
