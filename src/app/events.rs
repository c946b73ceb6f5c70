//! Outbound node events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through
//! the [`EventSink`](super::ports::EventSink) port. Adapters on the other
//! side decide what to do with them (serial log, test recorder, etc.).

use crate::connectivity::ConnectivityPhase;
use crate::telemetry::TelemetryReport;

use super::commands::Command;

/// Who asked for a command to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// Received on a control topic.
    Remote,
    /// Produced by the local climate rules.
    Automation,
}

/// Structured events emitted by the node core.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// Outputs driven to their initial state; the loop is about to run.
    Started,

    /// The connectivity state machine moved.
    ConnectivityChanged {
        from: ConnectivityPhase,
        to: ConnectivityPhase,
    },

    /// A command changed an actuator.
    CommandApplied { command: Command, source: CommandSource },

    /// A control message addressed no known actuator.
    CommandIgnored,

    /// A telemetry cycle published its payloads.
    Telemetry(TelemetryReport),

    /// A telemetry cycle was skipped because the sensor read failed.
    SensorUnavailable,
}
