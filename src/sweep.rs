//! Fan louvre sweep scheduler.
//!
//! While the fan is commanded on, the servo oscillates 0↔180° one degree
//! per step interval, independent of how fast the node loop spins. When
//! the fan is commanded off the servo is returned to 0° with a single
//! write and stays there.

use log::debug;

use crate::app::commands::Actuator;
use crate::app::ports::ActuatorPort;
use crate::app::state::ActuatorState;
use crate::scheduler::IntervalTimer;

pub struct SweepScheduler {
    step: IntervalTimer,
}

impl SweepScheduler {
    pub fn new(step_interval_ms: u32) -> Self {
        Self {
            step: IntervalTimer::new(step_interval_ms),
        }
    }

    /// Advance or park the sweep. Returns the angle written, if any.
    ///
    /// At most one servo write per call, and only when the position
    /// actually changes.
    pub fn tick(
        &mut self,
        now_ms: u64,
        state: &mut ActuatorState,
        out: &mut impl ActuatorPort,
    ) -> Option<u8> {
        if state.is_on(Actuator::Fan) {
            if !self.step.try_fire(now_ms) {
                return None;
            }
            let angle = state.advance_sweep();
            out.set_sweep_angle(angle);
            Some(angle)
        } else if state.park_sweep() {
            debug!("sweep: fan off, parking servo");
            out.set_sweep_angle(0);
            Some(0)
        } else {
            None
        }
    }
}
