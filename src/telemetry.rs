//! Periodic telemetry publisher.
//!
//! Every publish interval the node samples the climate sensor and the
//! door switch and publishes two JSON documents:
//!
//! | Topic                      | Payload                                                        |
//! |----------------------------|----------------------------------------------------------------|
//! | `.../telemetry/environment`| `{"temperature":23.5,"humidity":61.0}`                         |
//! | `.../telemetry/status`     | `{"door":"OPEN","light_state":"ON","fan_state":"OFF",`         |
//! |                            | ` "sprinkler_state":"OFF","interval":2000}`                    |
//!
//! The clock restarts on every firing whatever the outcome, so an invalid
//! reading or an offline session skips exactly one cycle.

use log::{debug, warn};
use serde::Serialize;

use crate::app::commands::{Actuator, Switch};
use crate::app::ports::{BrokerPort, SensorPort};
use crate::app::state::ActuatorState;
use crate::scheduler::IntervalTimer;
use crate::topics::Topics;

// ── Sensor data ───────────────────────────────────────────────

/// Door switch position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DoorState {
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "CLOSED")]
    Closed,
}

impl DoorState {
    /// The switch input is pulled up: HIGH means the door is open.
    pub const fn from_level(high: bool) -> Self {
        if high { Self::Open } else { Self::Closed }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }
}

/// One climate reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub valid: bool,
}

impl SensorSample {
    pub const fn new(temperature_c: f32, humidity_pct: f32) -> Self {
        Self {
            temperature_c,
            humidity_pct,
            valid: true,
        }
    }

    /// A failed read.
    pub const fn invalid() -> Self {
        Self {
            temperature_c: f32::NAN,
            humidity_pct: f32::NAN,
            valid: false,
        }
    }

    /// Valid flag set and both values are real numbers.
    pub fn is_valid(&self) -> bool {
        self.valid && self.temperature_c.is_finite() && self.humidity_pct.is_finite()
    }
}

// ── Wire payloads ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentPayload {
    pub temperature: f32,
    pub humidity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPayload {
    pub door: DoorState,
    pub light_state: Switch,
    pub fan_state: Switch,
    pub sprinkler_state: Switch,
    /// Publish interval in milliseconds.
    pub interval: u32,
}

impl StatusPayload {
    pub fn capture(door: DoorState, state: &ActuatorState, interval_ms: u32) -> Self {
        Self {
            door,
            light_state: state.switch(Actuator::Light),
            fan_state: state.switch(Actuator::Fan),
            sprinkler_state: state.switch(Actuator::Sprinkler),
            interval: interval_ms,
        }
    }
}

/// What one publish cycle sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryReport {
    pub environment: EnvironmentPayload,
    pub status: StatusPayload,
    pub environment_sent: bool,
    pub status_sent: bool,
}

/// Result of one [`TelemetryPublisher::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryOutcome {
    /// Interval not yet elapsed.
    NotDue,
    /// Interval elapsed but there is no broker session.
    Offline,
    /// Interval elapsed but the climate reading was invalid.
    SensorUnavailable,
    /// Payloads were handed to the broker.
    Published(TelemetryReport),
}

// ── Publisher ─────────────────────────────────────────────────

pub struct TelemetryPublisher {
    timer: IntervalTimer,
    topics: Topics,
}

impl TelemetryPublisher {
    pub fn new(interval_ms: u32, topics: Topics) -> Self {
        Self {
            timer: IntervalTimer::new(interval_ms),
            topics,
        }
    }

    pub fn tick(
        &mut self,
        now_ms: u64,
        online: bool,
        state: &ActuatorState,
        sensors: &mut impl SensorPort,
        broker: &mut impl BrokerPort,
    ) -> TelemetryOutcome {
        if !self.timer.try_fire(now_ms) {
            return TelemetryOutcome::NotDue;
        }
        if !online {
            debug!("telemetry: offline, cycle skipped");
            return TelemetryOutcome::Offline;
        }

        let sample = sensors.read_climate();
        if !sample.is_valid() {
            warn!("telemetry: failed to read from DHT sensor, cycle skipped");
            return TelemetryOutcome::SensorUnavailable;
        }

        let environment = EnvironmentPayload {
            temperature: sample.temperature_c,
            humidity: sample.humidity_pct,
        };
        let status = StatusPayload::capture(sensors.door_state(), state, self.timer.period_ms() as u32);

        let environment_sent = publish_json(broker, &self.topics.environment, &environment);
        let status_sent = publish_json(broker, &self.topics.status, &status);

        TelemetryOutcome::Published(TelemetryReport {
            environment,
            status,
            environment_sent,
            status_sent,
        })
    }
}

fn publish_json(broker: &mut impl BrokerPort, topic: &str, payload: &impl Serialize) -> bool {
    let bytes = match serde_json::to_vec(payload) {
        Ok(b) => b,
        Err(e) => {
            warn!("telemetry: encode for '{}' failed: {}", topic, e);
            return false;
        }
    };
    match broker.publish(topic, &bytes) {
        Ok(()) => true,
        Err(e) => {
            warn!("telemetry: publish to '{}' failed: {}", topic, e);
            false
        }
    }
}
