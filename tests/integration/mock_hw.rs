//! Mock adapters for integration tests.
//!
//! Records every actuator call and every publish so tests can assert on
//! the full history without touching real GPIO, PWM or sockets.

use std::collections::VecDeque;

use greenhouse_node::app::events::NodeEvent;
use greenhouse_node::app::ports::{
    ActuatorPort, BrokerPort, EntropyPort, EventSink, LinkPort, SensorPort,
};
use greenhouse_node::error::CommsError;
use greenhouse_node::inbox::InboundMessage;
use greenhouse_node::telemetry::{DoorState, SensorSample};
use greenhouse_node::topics::filter_matches;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    Light(bool),
    Sprinkler(bool),
    Sweep(u8),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub sample: SensorSample,
    pub door: DoorState,
    pub climate_reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            sample: SensorSample::new(24.5, 58.0),
            door: DoorState::Closed,
            climate_reads: 0,
        }
    }

    pub fn light_writes(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Light(on) => Some(*on),
                _ => None,
            })
            .collect()
    }

    pub fn sprinkler_writes(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Sprinkler(on) => Some(*on),
                _ => None,
            })
            .collect()
    }

    pub fn sweep_writes(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Sweep(deg) => Some(*deg),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl SensorPort for MockHardware {
    fn read_climate(&mut self) -> SensorSample {
        self.climate_reads += 1;
        self.sample
    }

    fn door_state(&mut self) -> DoorState {
        self.door
    }
}

impl ActuatorPort for MockHardware {
    fn set_light(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Light(on));
    }

    fn set_sprinkler(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Sprinkler(on));
    }

    fn set_sweep_angle(&mut self, degrees: u8) {
        self.calls.push(ActuatorCall::Sweep(degrees));
    }
}

// ── MockNetwork ───────────────────────────────────────────────

/// Link, broker and entropy in one. Sessions come up synchronously
/// unless `refuse_sessions` is set.
pub struct MockNetwork {
    pub link_up: bool,
    pub session_up: bool,
    pub refuse_sessions: bool,
    pub fail_subscribe: bool,
    pub link_kicks: u32,
    pub client_ids: Vec<String>,
    pub subscriptions: Vec<String>,
    pub published: Vec<(String, String)>,
    inbound: VecDeque<InboundMessage>,
    entropy: u32,
}

#[allow(dead_code)]
impl MockNetwork {
    /// Link up, broker accepting.
    pub fn online() -> Self {
        Self {
            link_up: true,
            ..Self::offline()
        }
    }

    pub fn offline() -> Self {
        Self {
            link_up: false,
            session_up: false,
            refuse_sessions: false,
            fail_subscribe: false,
            link_kicks: 0,
            client_ids: Vec::new(),
            subscriptions: Vec::new(),
            published: Vec::new(),
            inbound: VecDeque::new(),
            entropy: 0,
        }
    }

    /// Queue a message as the broker would deliver it: only when it
    /// matches a live subscription.
    pub fn inject(&mut self, topic: &str, payload: &str) -> bool {
        if !self.session_up || !self.subscriptions.iter().any(|f| filter_matches(f, topic)) {
            return false;
        }
        match InboundMessage::new(topic, payload.as_bytes()) {
            Some(msg) => {
                self.inbound.push_back(msg);
                true
            }
            None => false,
        }
    }

    /// Broker side drops the session; the link stays up.
    pub fn drop_session(&mut self) {
        self.session_up = false;
        self.subscriptions.clear();
    }

    pub fn pending(&self) -> usize {
        self.inbound.len()
    }

    pub fn published_on(&self, topic: &str) -> Vec<&str> {
        self.published
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.as_str())
            .collect()
    }
}

impl LinkPort for MockNetwork {
    fn is_link_up(&self) -> bool {
        self.link_up
    }

    fn begin_connect(&mut self) -> Result<(), CommsError> {
        self.link_kicks += 1;
        Ok(())
    }
}

impl BrokerPort for MockNetwork {
    fn connect(&mut self, client_id: &str) -> Result<(), CommsError> {
        self.inbound.clear();
        self.client_ids.push(client_id.to_string());
        if self.refuse_sessions {
            return Err(CommsError::SessionRefused(5));
        }
        self.session_up = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.session_up = false;
        self.subscriptions.clear();
        self.inbound.clear();
    }

    fn is_connected(&self) -> bool {
        self.session_up
    }

    fn subscribe(&mut self, filter: &str) -> Result<(), CommsError> {
        if self.fail_subscribe {
            return Err(CommsError::SubscribeFailed);
        }
        self.subscriptions.push(filter.to_string());
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.session_up {
            return Err(CommsError::NotConnected);
        }
        self.published
            .push((topic.to_string(), String::from_utf8_lossy(payload).into_owned()));
        Ok(())
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.inbound.pop_front()
    }
}

impl EntropyPort for MockNetwork {
    fn next_u32(&mut self) -> u32 {
        self.entropy = self.entropy.wrapping_add(7);
        self.entropy
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<NodeEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&NodeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &NodeEvent) {
        self.events.push(event.clone());
    }
}
