//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`] — the hexagonal boundary for the network link.
//! Association is started with [`LinkPort::begin_connect`] and observed
//! through [`LinkPort::is_link_up`]; nothing here blocks. Retry pacing
//! belongs to the connectivity state machine.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::LinkPort;
use crate::config::NodeConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::eventloop::EspSystemEventLoop;
#[cfg(target_os = "espidf")]
use esp_idf_hal::modem::Modem;
#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::EspDefaultNvsPartition;
#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    /// Driver configured and started; done lazily on the first connect.
    started: bool,
    ssid: heapless::String<32>,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    password: heapless::String<64>,
    connect_requests: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_refuse: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        config: &NodeConfig,
    ) -> Result<Self, CommsError> {
        let wifi = EspWifi::new(modem, sysloop, Some(nvs)).map_err(|e| {
            warn!("WiFi: driver init failed: {}", e);
            CommsError::WifiConfigFailed
        })?;
        Ok(Self {
            wifi,
            started: false,
            ssid: config.wifi_ssid.clone(),
            password: config.wifi_password.clone(),
            connect_requests: 0,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            started: false,
            ssid: config.wifi_ssid.clone(),
            password: config.wifi_password.clone(),
            connect_requests: 0,
            sim_link_up: false,
            sim_refuse: false,
        }
    }

    /// Number of connect requests issued since boot.
    pub fn connect_requests(&self) -> u32 {
        self.connect_requests
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client = ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| CommsError::WifiConfigFailed)?,
            password: self.password.as_str().try_into().map_err(|_| CommsError::WifiConfigFailed)?,
            auth_method,
            ..Default::default()
        };
        self.wifi
            .set_configuration(&Configuration::Client(client))
            .map_err(|e| {
                warn!("WiFi: set_configuration failed: {}", e);
                CommsError::WifiConfigFailed
            })?;
        self.wifi.start().map_err(|e| {
            warn!("WiFi: start failed: {}", e);
            CommsError::WifiConfigFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self) -> Result<(), CommsError> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: connect failed: {}", e);
            CommsError::WifiConnectFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if self.sim_refuse {
            return Err(CommsError::WifiConnectFailed);
        }
        self.sim_link_up = true;
        Ok(())
    }

    // ── Simulation controls ───────────────────────────────────

    /// Drop or restore the simulated link.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_set_link(&mut self, up: bool) {
        self.sim_link_up = up;
    }

    /// Make subsequent connect requests fail.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_refuse_connect(&mut self, refuse: bool) {
        self.sim_refuse = refuse;
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

impl LinkPort for WifiAdapter {
    #[cfg(target_os = "espidf")]
    fn is_link_up(&self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_link_up(&self) -> bool {
        self.sim_link_up
    }

    fn begin_connect(&mut self) -> Result<(), CommsError> {
        if !self.started {
            self.platform_start()?;
            self.started = true;
        }
        self.connect_requests += 1;
        info!("WiFi: connecting to '{}' (request {})", self.ssid, self.connect_requests);
        self.platform_connect()
    }
}
