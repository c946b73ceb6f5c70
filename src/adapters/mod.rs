//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                | Connects to                 |
//! |------------|---------------------------|-----------------------------|
//! | `hardware` | SensorPort, ActuatorPort  | DHT22, door, relays, servo  |
//! | `wifi`     | LinkPort                  | ESP-IDF WiFi STA            |
//! | `mqtt`     | BrokerPort                | ESP-IDF MQTT client         |
//! | `entropy`  | EntropyPort               | ESP32 hardware RNG          |
//! | `network`  | Link + Broker + Entropy   | wifi + mqtt + entropy       |
//! | `log_sink` | EventSink                 | Serial log output           |
//! | `time`     | —                         | ESP32 system timer          |

pub mod entropy;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod network;
pub mod time;
pub mod wifi;
