//! Sensor drivers: DHT22 climate sensor and door reed switch.
//!
//! Both are aggregated behind [`SensorPort`](crate::app::ports::SensorPort)
//! by the hardware adapter.

pub mod dht22;
pub mod door;
