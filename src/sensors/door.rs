//! Greenhouse door reed switch.
//!
//! The input has its pull-up enabled; the closed door's magnet pulls it
//! to ground. HIGH therefore means OPEN, and a broken wire reads as open.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::telemetry::DoorState;

pub struct DoorSwitch<P> {
    pin: P,
    last: DoorState,
}

impl<P: InputPin> DoorSwitch<P> {
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            last: DoorState::Closed,
        }
    }

    /// Current position; a failed read repeats the last known one.
    pub fn read(&mut self) -> DoorState {
        match self.pin.is_high() {
            Ok(high) => self.last = DoorState::from_level(high),
            Err(e) => warn!("door switch read failed: {:?}", e),
        }
        self.last
    }
}
