//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured node events to the
//! ESP-IDF logger (which goes to UART in production).

use log::{info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`NodeEvent`] to the serial console.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::Telemetry(t) => {
                info!(
                    "TELEM | T={:.1}\u{00b0}C RH={:.1}% | door={} | light={} fan={} sprinkler={} | sent env={} status={}",
                    t.environment.temperature,
                    t.environment.humidity,
                    t.status.door.as_str(),
                    t.status.light_state.as_str(),
                    t.status.fan_state.as_str(),
                    t.status.sprinkler_state.as_str(),
                    t.environment_sent,
                    t.status_sent,
                );
            }
            NodeEvent::ConnectivityChanged { from, to } => {
                info!("LINK  | {:?} -> {:?}", from, to);
            }
            NodeEvent::CommandApplied { command, source } => {
                info!(
                    "CMD   | {} -> {} ({:?})",
                    command.target.as_str(),
                    command.value.as_str(),
                    source
                );
            }
            NodeEvent::CommandIgnored => {
                info!("CMD   | ignored (unknown control topic)");
            }
            NodeEvent::SensorUnavailable => {
                warn!("TELEM | skipped, sensor unavailable");
            }
            NodeEvent::Started => {
                info!("START | outputs off, servo parked");
            }
        }
    }
}
