//! Node service — the hexagonal core.
//!
//! [`NodeService`] owns the actuator state, the connectivity state
//! machine, the sweep scheduler and the telemetry publisher. All I/O
//! flows through port traits injected at call sites, making the entire
//! loop testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                  │         NodeService          │
//! ActuatorPort ◀── │ Connectivity · Commands      │ ◀─▶ LinkPort / BrokerPort
//!                  │ Sweep · Telemetry · Rules    │
//!                  └─────────────────────────────┘
//! ```
//!
//! One [`tick`](NodeService::tick) is one loop iteration, in this order:
//!
//! 1. poll connectivity;
//! 2. if connected, drain pending control messages;
//! 3. advance the sweep;
//! 4. run the telemetry cycle (and local climate rules on a published sample).
//!
//! Commands received in an iteration are therefore visible to the sweep
//! and to the status payload of that same iteration.

use log::{debug, info};

use crate::automation;
use crate::config::NodeConfig;
use crate::connectivity::{ConnectivityManager, ConnectivityPhase};
use crate::inbox::INBOX_DEPTH;
use crate::sweep::SweepScheduler;
use crate::telemetry::{SensorSample, TelemetryOutcome, TelemetryPublisher};
use crate::topics::Topics;

use super::commands::{self, Actuator, Command};
use super::events::{CommandSource, NodeEvent};
use super::ports::{ActuatorPort, BrokerPort, EntropyPort, EventSink, LinkPort, SensorPort};
use super::state::ActuatorState;

/// Loop counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub iterations: u64,
    pub commands_applied: u32,
    pub commands_ignored: u32,
    pub telemetry_published: u32,
    pub telemetry_skipped: u32,
}

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

pub struct NodeService {
    config: NodeConfig,
    state: ActuatorState,
    connectivity: ConnectivityManager,
    sweep: SweepScheduler,
    telemetry: TelemetryPublisher,
    stats: NodeStats,
}

impl NodeService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch any output; call [`start`](Self::start) next.
    pub fn new(config: NodeConfig) -> Self {
        let topics = Topics::for_node(&config.node_id);
        let connectivity = ConnectivityManager::new(&config, topics.control_filter.clone());
        let sweep = SweepScheduler::new(config.sweep_step_interval_ms);
        let telemetry = TelemetryPublisher::new(config.publish_interval_ms, topics);
        Self {
            config,
            state: ActuatorState::new(),
            connectivity,
            sweep,
            telemetry,
            stats: NodeStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output to the known initial state.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.state = ActuatorState::new();
        hw.set_light(false);
        hw.set_sprinkler(false);
        hw.set_sweep_angle(0);
        sink.emit(&NodeEvent::Started);
        info!("NodeService started as '{}'", self.config.node_id);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration at monotonic time `now_ms`.
    ///
    /// `hw` satisfies both [`SensorPort`] and [`ActuatorPort`]; `net`
    /// carries the link, the broker session and the client-id entropy.
    pub fn tick<H, N>(&mut self, now_ms: u64, hw: &mut H, net: &mut N, sink: &mut impl EventSink)
    where
        H: SensorPort + ActuatorPort,
        N: LinkPort + BrokerPort + EntropyPort,
    {
        self.stats.iterations += 1;

        // 1. Connectivity
        let before = self.connectivity.phase();
        let online = self.connectivity.ensure_connected(now_ms, net);
        let after = self.connectivity.phase();
        if before != after {
            sink.emit(&NodeEvent::ConnectivityChanged { from: before, to: after });
        }

        // 2. Inbound commands, bounded so a flood cannot starve the sweep
        if online {
            for _ in 0..INBOX_DEPTH {
                let Some(msg) = net.poll_inbound() else { break };
                self.handle_message(&msg.topic, &msg.payload, hw, sink);
            }
        }

        // 3. Sweep
        self.sweep.tick(now_ms, &mut self.state, hw);

        // 4. Telemetry
        match self.telemetry.tick(now_ms, online, &self.state, hw, net) {
            TelemetryOutcome::NotDue => {}
            TelemetryOutcome::Offline => self.stats.telemetry_skipped += 1,
            TelemetryOutcome::SensorUnavailable => {
                self.stats.telemetry_skipped += 1;
                sink.emit(&NodeEvent::SensorUnavailable);
            }
            TelemetryOutcome::Published(report) => {
                self.stats.telemetry_published += 1;
                sink.emit(&NodeEvent::Telemetry(report));
                let sample = SensorSample::new(
                    report.environment.temperature,
                    report.environment.humidity,
                );
                for cmd in automation::evaluate(&self.config.automation, &sample).into_iter().flatten() {
                    self.apply(cmd, CommandSource::Automation, hw, sink);
                }
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Decode and apply one control message.
    ///
    /// Returns the decoded command, or `None` if the topic addressed no
    /// known actuator.
    pub fn handle_message(
        &mut self,
        topic: &str,
        payload: &[u8],
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Option<Command> {
        let Some(cmd) = commands::decode(topic, payload) else {
            debug!("control: no actuator for '{}'", topic);
            self.stats.commands_ignored += 1;
            sink.emit(&NodeEvent::CommandIgnored);
            return None;
        };
        self.apply(cmd, CommandSource::Remote, hw, sink);
        Some(cmd)
    }

    /// Apply a command. Returns `true` if the actuator state changed.
    ///
    /// Light and sprinkler outputs are written immediately; the fan only
    /// flips its flag and the sweep scheduler acts on it. A command that
    /// matches the current state writes nothing.
    pub fn apply(
        &mut self,
        cmd: Command,
        source: CommandSource,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> bool {
        let on = cmd.value.is_on();
        if !self.state.set(cmd.target, on) {
            debug!("control: {} already {}", cmd.target.as_str(), cmd.value.as_str());
            return false;
        }
        match cmd.target {
            Actuator::Light => hw.set_light(on),
            Actuator::Sprinkler => hw.set_sprinkler(on),
            Actuator::Fan => {}
        }
        self.stats.commands_applied += 1;
        info!("control: {} -> {} ({:?})", cmd.target.as_str(), cmd.value.as_str(), source);
        sink.emit(&NodeEvent::CommandApplied { command: cmd, source });
        true
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &ActuatorState {
        &self.state
    }

    pub fn connectivity(&self) -> ConnectivityPhase {
        self.connectivity.phase()
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_connected()
    }

    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    pub fn connectivity_stats(&self) -> crate::connectivity::ConnectivityStats {
        self.connectivity.stats()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}
