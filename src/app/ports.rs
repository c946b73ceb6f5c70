//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (sensors, outputs, network, event sinks) implement
//! these traits. The [`NodeService`](super::service::NodeService) consumes
//! them via generics, so the domain core never touches hardware directly.
//! Every method is non-blocking: the node loop must keep its sweep and
//! telemetry clocks running while the network recovers.

use crate::error::CommsError;
use crate::inbox::InboundMessage;
use crate::telemetry::{DoorState, SensorSample};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per telemetry cycle.
pub trait SensorPort {
    /// Temperature and humidity. Driver failures come back as an
    /// invalid sample rather than an error.
    fn read_climate(&mut self) -> SensorSample;

    /// Current door switch position.
    fn door_state(&mut self) -> DoorState;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port. All writes are fire-and-forget; adapters log
/// their own failures.
pub trait ActuatorPort {
    fn set_light(&mut self, on: bool);

    fn set_sprinkler(&mut self, on: bool);

    /// Move the fan louvre servo to `degrees` (0–180).
    fn set_sweep_angle(&mut self, degrees: u8);
}

// ───────────────────────────────────────────────────────────────
// Network ports (driven adapter: domain ↔ WiFi / MQTT)
// ───────────────────────────────────────────────────────────────

/// The physical network link (WiFi station).
pub trait LinkPort {
    fn is_link_up(&self) -> bool;

    /// Start associating with the access point. Returns immediately;
    /// progress is observed through [`is_link_up`](Self::is_link_up).
    fn begin_connect(&mut self) -> Result<(), CommsError>;
}

/// The broker session.
///
/// `connect` may complete synchronously (`Ok` with `is_connected()`
/// true) or asynchronously (`Ok` with the session coming up on a later
/// poll). Either way it must not block for longer than one attempt.
pub trait BrokerPort {
    fn connect(&mut self, client_id: &str) -> Result<(), CommsError>;

    /// Tear the session down. Safe to call when not connected.
    ///
    /// Messages delivered but not yet polled are discarded, and a new
    /// `connect` starts with nothing pending.
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    fn subscribe(&mut self, filter: &str) -> Result<(), CommsError>;

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError>;

    /// Next message delivered on a subscribed topic, if any.
    fn poll_inbound(&mut self) -> Option<InboundMessage>;
}

/// Source of the random suffix in broker client ids.
pub trait EntropyPort {
    fn next_u32(&mut self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`NodeEvent`](super::events::NodeEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::NodeEvent);
}
