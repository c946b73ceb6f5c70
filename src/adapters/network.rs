//! Network adapter — WiFi link, broker session and client-id entropy
//! behind one value, so the node loop can take a single `net` handle.

use crate::app::ports::{BrokerPort, EntropyPort, LinkPort};
use crate::error::CommsError;
use crate::inbox::InboundMessage;

use super::entropy::EntropySource;
use super::mqtt::MqttAdapter;
use super::wifi::WifiAdapter;

pub struct NetworkAdapter {
    wifi: WifiAdapter,
    mqtt: MqttAdapter,
    entropy: EntropySource,
}

impl NetworkAdapter {
    pub fn new(wifi: WifiAdapter, mqtt: MqttAdapter, entropy: EntropySource) -> Self {
        Self { wifi, mqtt, entropy }
    }

    pub fn wifi(&self) -> &WifiAdapter {
        &self.wifi
    }

    pub fn wifi_mut(&mut self) -> &mut WifiAdapter {
        &mut self.wifi
    }

    pub fn mqtt(&self) -> &MqttAdapter {
        &self.mqtt
    }

    pub fn mqtt_mut(&mut self) -> &mut MqttAdapter {
        &mut self.mqtt
    }
}

impl LinkPort for NetworkAdapter {
    fn is_link_up(&self) -> bool {
        self.wifi.is_link_up()
    }

    fn begin_connect(&mut self) -> Result<(), CommsError> {
        self.wifi.begin_connect()
    }
}

impl BrokerPort for NetworkAdapter {
    fn connect(&mut self, client_id: &str) -> Result<(), CommsError> {
        if !self.wifi.is_link_up() {
            return Err(CommsError::LinkDown);
        }
        self.mqtt.connect(client_id)
    }

    fn disconnect(&mut self) {
        self.mqtt.disconnect();
    }

    fn is_connected(&self) -> bool {
        self.mqtt.is_connected()
    }

    fn subscribe(&mut self, filter: &str) -> Result<(), CommsError> {
        self.mqtt.subscribe(filter)
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), CommsError> {
        self.mqtt.publish(topic, payload)
    }

    fn poll_inbound(&mut self) -> Option<InboundMessage> {
        self.mqtt.poll_inbound()
    }
}

impl EntropyPort for NetworkAdapter {
    fn next_u32(&mut self) -> u32 {
        self.entropy.next_u32()
    }
}
