//! Greenhouse Node Firmware — Main Entry Point
//!
//! Hexagonal architecture driven by a single cooperative loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   NetworkAdapter        LogEventSink          │
//! │  (Sensor+Actuator) (Link+Broker+Entropy) (EventSink)           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              NodeService (pure logic)                  │    │
//! │  │  Connectivity · Commands · Sweep · Telemetry           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{ensure, Result};
use log::info;

use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use greenhouse_node::adapters::entropy::EntropySource;
use greenhouse_node::adapters::hardware::HardwareAdapter;
use greenhouse_node::adapters::log_sink::LogEventSink;
use greenhouse_node::adapters::mqtt::MqttAdapter;
use greenhouse_node::adapters::network::NetworkAdapter;
use greenhouse_node::adapters::time::MonotonicClock;
use greenhouse_node::adapters::wifi::WifiAdapter;
use greenhouse_node::app::service::NodeService;
use greenhouse_node::config::NodeConfig;
use greenhouse_node::drivers::hw_init;
use greenhouse_node::drivers::relay::RelayDriver;
use greenhouse_node::drivers::servo::ServoDriver;
use greenhouse_node::error::Error;
use greenhouse_node::pins;
use greenhouse_node::sensors::dht22::Dht22;
use greenhouse_node::sensors::door::DoorSwitch;

/// Idle time between loop iterations.
const LOOP_IDLE_MS: u64 = 1;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Greenhouse node v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = NodeConfig::default();
    config.validate().map_err(Error::from)?;
    info!(
        "Node '{}' → broker {}:{}",
        config.node_id, config.broker_host, config.broker_port
    );

    // ── 2. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    hw_init::init_peripherals()?;

    let light_pin = PinDriver::output(peripherals.pins.gpio13)?;
    let sprinkler_pin = PinDriver::output(peripherals.pins.gpio23)?;
    let mut door_pin = PinDriver::input(peripherals.pins.gpio14)?;
    door_pin.set_pull(Pull::Up)?;
    ensure!(
        light_pin.pin() == pins::LIGHT_RELAY_GPIO
            && sprinkler_pin.pin() == pins::SPRINKLER_RELAY_GPIO
            && door_pin.pin() == pins::DOOR_SWITCH_GPIO,
        "pin drivers do not match the pin map"
    );
    info!(
        "Pins: light=GPIO{} sprinkler=GPIO{} door=GPIO{} dht=GPIO{} servo=GPIO{}",
        pins::LIGHT_RELAY_GPIO,
        pins::SPRINKLER_RELAY_GPIO,
        pins::DOOR_SWITCH_GPIO,
        pins::DHT_DATA_GPIO,
        pins::SERVO_PWM_GPIO
    );

    let mut hw = HardwareAdapter::new(
        Dht22::new(pins::DHT_DATA_GPIO),
        DoorSwitch::new(door_pin),
        RelayDriver::new(light_pin, "light"),
        RelayDriver::new(sprinkler_pin, "sprinkler"),
        ServoDriver::new(),
        MonotonicClock::new(),
    );

    // ── 3. Network ────────────────────────────────────────────
    let wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs, &config).map_err(Error::from)?;
    let mqtt = MqttAdapter::new(&config);
    info!("MQTT broker URL: {}", mqtt.url());
    let mut net = NetworkAdapter::new(wifi, mqtt, EntropySource::new());

    // ── 4. Node loop ──────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let mut node = NodeService::new(config);
    node.start(&mut hw, &mut sink);

    loop {
        node.tick(clock.now_ms(), &mut hw, &mut net, &mut sink);
        std::thread::sleep(std::time::Duration::from_millis(LOOP_IDLE_MS));
    }
}
