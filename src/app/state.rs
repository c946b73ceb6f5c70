//! Actuator state owned by the node loop.
//!
//! Holds the commanded on/off value of every output plus the live sweep
//! position of the fan servo. Only command ingestion and the sweep
//! scheduler mutate it, both synchronously from the loop.

use super::commands::{Actuator, Switch};

/// Upper bound of the sweep, in degrees.
pub const SWEEP_MAX_DEG: u8 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepDirection {
    #[default]
    Forward,
    Reverse,
}

impl SweepDirection {
    const fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }
}

/// Commanded outputs and sweep position.
///
/// Invariant: `sweep_position` is always within `0..=SWEEP_MAX_DEG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorState {
    light: bool,
    fan: bool,
    sprinkler: bool,
    sweep_position: u8,
    sweep_direction: SweepDirection,
}

impl ActuatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_on(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Light => self.light,
            Actuator::Fan => self.fan,
            Actuator::Sprinkler => self.sprinkler,
        }
    }

    pub fn switch(&self, actuator: Actuator) -> Switch {
        Switch::from_bool(self.is_on(actuator))
    }

    pub fn sweep_position(&self) -> u8 {
        self.sweep_position
    }

    pub fn sweep_direction(&self) -> SweepDirection {
        self.sweep_direction
    }

    /// Record a commanded value. Returns `true` if it changed.
    pub fn set(&mut self, actuator: Actuator, on: bool) -> bool {
        let slot = match actuator {
            Actuator::Light => &mut self.light,
            Actuator::Fan => &mut self.fan,
            Actuator::Sprinkler => &mut self.sprinkler,
        };
        let changed = *slot != on;
        *slot = on;
        changed
    }

    /// Move one degree in the current direction, reversing at either bound.
    ///
    /// Returns the new position.
    pub fn advance_sweep(&mut self) -> u8 {
        self.sweep_position = match self.sweep_direction {
            SweepDirection::Forward => (self.sweep_position + 1).min(SWEEP_MAX_DEG),
            SweepDirection::Reverse => self.sweep_position.saturating_sub(1),
        };
        if self.sweep_position == 0 || self.sweep_position == SWEEP_MAX_DEG {
            self.sweep_direction = self.sweep_direction.flipped();
        }
        self.sweep_position
    }

    /// Return the sweep to rest. Returns `true` if the position moved.
    pub fn park_sweep(&mut self) -> bool {
        let moved = self.sweep_position != 0;
        self.sweep_position = 0;
        self.sweep_direction = SweepDirection::Forward;
        moved
    }
}
