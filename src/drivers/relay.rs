//! Relay output driver (grow light, sprinkler valve).
//!
//! Generic over an `embedded-hal` output pin: on ESP-IDF this is an
//! `esp_idf_hal::gpio::PinDriver<_, Output>`, in tests any mock pin.
//! Writes are fire-and-forget; a failed write is logged and the relay
//! keeps reporting the last value that was actually applied.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct RelayDriver<P> {
    pin: P,
    name: &'static str,
    on: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Wrap `pin`. The relay is assumed off until the first `set`.
    pub fn new(pin: P, name: &'static str) -> Self {
        Self { pin, name, on: false }
    }

    pub fn set(&mut self, on: bool) {
        let result = if on { self.pin.set_high() } else { self.pin.set_low() };
        match result {
            Ok(()) => self.on = on,
            Err(e) => warn!("relay {}: write {} failed: {:?}", self.name, on, e),
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
