//! MQTT broker session adapter.
//!
//! Implements [`BrokerPort`]. Each [`BrokerPort::connect`] creates a
//! fresh client with the given client id; the session comes up
//! asynchronously and is observed through [`BrokerPort::is_connected`].
//! Messages on subscribed topics land in the shared [`Inbox`] and are
//! handed out by [`BrokerPort::poll_inbound`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`,
//!   with a small thread pumping the connection's events.
//! - **all other targets**: an in-memory broker for host-side tests that
//!   honours subscriptions and records every publish.

use core::fmt::Write;
use std::sync::Arc;

use log::info;

use crate::app::ports::BrokerPort;
use crate::config::NodeConfig;
use crate::error::CommsError;
use crate::inbox::{InboundMessage, Inbox};

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicBool, Ordering};
#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{
    EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
};
#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(not(target_os = "espidf"))]
use crate::topics::filter_matches;

/// Stack for the event pump thread.
#[cfg(target_os = "espidf")]
const EVENT_TASK_STACK: usize = 6 * 1024;

#[cfg(target_os = "espidf")]
struct Session {
    client: EspMqttClient<'static>,
    connected: Arc<AtomicBool>,
    /// Cleared on teardown; the event pump stops delivering once false.
    live: Arc<AtomicBool>,
}

pub struct MqttAdapter {
    url: heapless::String<96>,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    buffer_size: usize,
    inbox: Arc<Inbox>,
    #[cfg(target_os = "espidf")]
    session: Option<Session>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

impl MqttAdapter {
    pub fn new(config: &NodeConfig) -> Self {
        let mut url = heapless::String::new();
        let _ = write!(url, "mqtt://{}:{}", config.broker_host, config.broker_port);
        Self {
            url,
            buffer_size: config.mqtt_buffer_size,
            inbox: Arc::new(Inbox::new()),
            #[cfg(target_os = "espidf")]
            session: None,
            #[cfg(not(target_os = "espidf"))]
            sim: SimBroker::default(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Messages dropped because the inbox was full or the topic too long.
    pub fn dropped_messages(&self) -> u32 {
        self.inbox.dropped()
    }

    /// Empty the inbox; whatever a closed session left undrained is stale.
    fn discard_pending(&mut self) {
        let n = self.inbox.clear();
        if n > 0 {
            info!("MQTT: discarded {} message(s) from the previous session", n);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn spawn_event_pump(
    mut connection: EspMqttConnection,
    connected: Arc<AtomicBool>,
    live: Arc<AtomicBool>,
    inbox: Arc<Inbox>,
) -> Result<(), CommsError> {
    std::thread::Builder::new()
        .name("mqtt-events".into())
        .stack_size(EVENT_TASK_STACK)
        .spawn(move || {
            // next() fails once the owning client is dropped.
            while let Ok(event) = connection.next() {
                match event.payload() {
                    EventPayload::Connected(_) => connected.store(true, Ordering::Release),
                    EventPayload::Disconnected => connected.store(false, Ordering::Release),
                    EventPayload::Received {
                        topic: Some(topic),
                        data,
                        ..
                    } if live.load(Ordering::Acquire) => {
                        inbox.deliver(topic, data);
                    }
                    EventPayload::Error(e) => warn!("MQTT: {:?}", e),
                    _ => {}
                }
            }
            connected.store(false, Ordering::Release);
            info!("MQTT: event pump stopped");
        })
        .map(|_| ())
        .map_err(|e| {
            warn!("MQTT: event task spawn failed: {}", e);
            CommsError::SessionRefused(-1)
        })
}

#[cfg(target_os = "espidf")]
impl BrokerPort for MqttAdapter {
    fn connect(&mut self, client_id: &str) -> Result<(), CommsError> {
        self.disconnect();
        let conf = MqttClientConfiguration {
            client_id: Some(client_id),
            buffer_size: self.buffer_size,
            // ConnectivityManager owns reconnection and resubscription.
            disable_auto_reconnect: true,
            ..Default::default()
        };
        let (client, connection) = EspMqttClient::new(&self.url, &conf)
            .map_err(|e| CommsError::SessionRefused(e.code()))?;
        let connected = Arc::new(AtomicBool::new(false));
        let live = Arc::new(AtomicBool::new(true));
        spawn_event_pump(connection, connected.clone(), live.clone(), self.inbox.clone())?;
        info!(
            "MQTT: client '{}' started for {} ({} inbound dropped since boot)",
            client_id,
            self.url,
            self.dropped_messages()
        );
        self.session = Some(Session { client, connected, live });
        Ok(())
    }

    fn disconnect(&mut self) {
        // Dropping the client stops it and ends the event pump.
        if let Some(session) = self.session.take() {
            session.live.store(false, Ordering::Release);
            info!("MQTT: session closed");
        }
        self.discard_pending();
    }

    fn is_connected(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.connected.load(Ordering::Acquire))
    }

    fn subscribe(&mut self, filter: &str) -> Result<(), CommsError> {
        let session = self.session.as_mut().ok_or(CommsError::NotConnected)?;
        session
            .client
            .subscribe(filter, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|_| CommsError::SubscribeFailed)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        let session = self.session.as_mut().ok_or(CommsError::NotConnected)?;
        session
            .client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .map(|_| ())
            .map_err(|_| CommsError::PublishFailed)
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.inbox.take()
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation broker
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimBroker {
    connected: bool,
    refuse_next: u32,
    client_ids: Vec<String>,
    subscriptions: Vec<String>,
    published: Vec<(String, Vec<u8>)>,
}

#[cfg(not(target_os = "espidf"))]
impl BrokerPort for MqttAdapter {
    fn connect(&mut self, client_id: &str) -> Result<(), CommsError> {
        self.discard_pending();
        self.sim.client_ids.push(client_id.into());
        if self.sim.refuse_next > 0 {
            self.sim.refuse_next -= 1;
            return Err(CommsError::SessionRefused(-2));
        }
        // Clean session: the broker forgets earlier subscriptions.
        self.sim.subscriptions.clear();
        self.sim.connected = true;
        info!(
            "MQTT(sim): '{}' connected to {} ({} inbound dropped since boot)",
            client_id,
            self.url,
            self.dropped_messages()
        );
        Ok(())
    }

    fn disconnect(&mut self) {
        self.sim.connected = false;
        self.sim.subscriptions.clear();
        self.discard_pending();
    }

    fn is_connected(&self) -> bool {
        self.sim.connected
    }

    fn subscribe(&mut self, filter: &str) -> Result<(), CommsError> {
        if !self.sim.connected {
            return Err(CommsError::NotConnected);
        }
        self.sim.subscriptions.push(filter.into());
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        if !self.sim.connected {
            return Err(CommsError::NotConnected);
        }
        self.sim.published.push((topic.into(), payload.to_vec()));
        Ok(())
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.inbox.take()
    }
}

#[cfg(not(target_os = "espidf"))]
impl MqttAdapter {
    /// Publish `payload` on `topic` from another client. Delivered only
    /// if the session is up and a subscription matches.
    pub fn sim_inject(&mut self, topic: &str, payload: &[u8]) -> bool {
        let subscribed = self.sim.subscriptions.iter().any(|f| filter_matches(f, topic));
        self.sim.connected && subscribed && self.inbox.deliver(topic, payload)
    }

    /// Broker-side session drop.
    pub fn sim_drop_session(&mut self) {
        self.sim.connected = false;
        self.sim.subscriptions.clear();
    }

    /// Refuse the next `n` session attempts.
    pub fn sim_refuse_sessions(&mut self, n: u32) {
        self.sim.refuse_next = n;
    }

    pub fn sim_published(&self) -> &[(String, Vec<u8>)] {
        &self.sim.published
    }

    pub fn sim_subscriptions(&self) -> &[String] {
        &self.sim.subscriptions
    }

    pub fn sim_client_ids(&self) -> &[String] {
        &self.sim.client_ids
    }
}
