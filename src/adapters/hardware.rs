//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the DHT22, the door switch, both relays and the servo, exposing
//! them through [`SensorPort`] and [`ActuatorPort`]. This is the only
//! module in the system that touches actual hardware. The relay and door
//! pins are generic `embedded-hal` pins; on non-espidf targets the DHT22
//! and servo use cfg-gated simulation stubs.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::relay::RelayDriver;
use crate::drivers::servo::ServoDriver;
use crate::sensors::dht22::Dht22;
use crate::sensors::door::DoorSwitch;
use crate::telemetry::{DoorState, SensorSample};

use super::time::MonotonicClock;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D, L, S> {
    climate: Dht22,
    door: DoorSwitch<D>,
    light: RelayDriver<L>,
    sprinkler: RelayDriver<S>,
    servo: ServoDriver,
    clock: MonotonicClock,
}

impl<D, L, S> HardwareAdapter<D, L, S>
where
    D: InputPin,
    L: OutputPin,
    S: OutputPin,
{
    pub fn new(
        climate: Dht22,
        door: DoorSwitch<D>,
        light: RelayDriver<L>,
        sprinkler: RelayDriver<S>,
        servo: ServoDriver,
        clock: MonotonicClock,
    ) -> Self {
        Self {
            climate,
            door,
            light,
            sprinkler,
            servo,
            clock,
        }
    }

    pub fn light_on(&self) -> bool {
        self.light.is_on()
    }

    pub fn sprinkler_on(&self) -> bool {
        self.sprinkler.is_on()
    }

    pub fn servo_angle(&self) -> Option<u8> {
        self.servo.angle()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<D, L, S> SensorPort for HardwareAdapter<D, L, S>
where
    D: InputPin,
    L: OutputPin,
    S: OutputPin,
{
    fn read_climate(&mut self) -> SensorSample {
        self.climate.read(self.clock.now_ms())
    }

    fn door_state(&mut self) -> DoorState {
        self.door.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<D, L, S> ActuatorPort for HardwareAdapter<D, L, S>
where
    D: InputPin,
    L: OutputPin,
    S: OutputPin,
{
    fn set_light(&mut self, on: bool) {
        self.light.set(on);
    }

    fn set_sprinkler(&mut self, on: bool) {
        self.sprinkler.set(on);
    }

    fn set_sweep_angle(&mut self, degrees: u8) {
        self.servo.set_angle(degrees);
    }
}
