//! Elapsed-time interval timers for the node loop.
//!
//! The loop never sleeps to pace its periodic duties. Each duty owns an
//! [`IntervalTimer`] and asks it, once per iteration, whether a full
//! period has passed since it last fired:
//!
//! ```text
//! now - last_fire >= period  →  fire, last_fire = now
//! ```
//!
//! A late iteration therefore never skips a due firing (it fires as soon
//! as it runs) and never fires twice for one period (the clock restarts
//! from the late time). Timestamps are monotonic milliseconds since boot;
//! a timestamp that goes backwards is treated as no elapsed time.

/// One periodic duty's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalTimer {
    period_ms: u64,
    last_fire_ms: u64,
}

impl IntervalTimer {
    /// A timer whose first firing is one full period after boot.
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms: period_ms as u64,
            last_fire_ms: 0,
        }
    }

    pub const fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub const fn last_fire_ms(&self) -> u64 {
        self.last_fire_ms
    }

    /// Whether a full period has elapsed at `now_ms`.
    pub const fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_fire_ms) >= self.period_ms
    }

    /// Fire if due, restarting the clock from `now_ms`.
    pub fn try_fire(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.last_fire_ms = now_ms;
            true
        } else {
            false
        }
    }
}
