//! Node configuration parameters
//!
//! All tunable parameters for the greenhouse node. Identity, WiFi
//! credentials and the broker host are fixed at build time through
//! environment variables (`GREENHOUSE_ID`, `WIFI_SSID`, `WIFI_PASSWORD`,
//! `MQTT_BROKER`); everything else has a compiled-in default.

use core::fmt;

use heapless::String;
use serde::{Deserialize, Serialize};

/// Maximum node identity length (it is embedded in every topic).
pub const NODE_ID_MAX: usize = 16;

const BUILD_NODE_ID: &str = match option_env!("GREENHOUSE_ID") {
    Some(v) => v,
    None => "gh1",
};
const BUILD_WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(v) => v,
    None => "Wokwi-GUEST",
};
const BUILD_WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(v) => v,
    None => "",
};
const BUILD_MQTT_BROKER: &str = match option_env!("MQTT_BROKER") {
    Some(v) => v,
    None => "broker-cn.emqx.io",
};

// Over-long build-time values fail the build instead of being cut short.
const _: () = assert!(BUILD_NODE_ID.len() <= NODE_ID_MAX, "GREENHOUSE_ID exceeds 16 bytes");
const _: () = assert!(BUILD_WIFI_SSID.len() <= 32, "WIFI_SSID exceeds 32 bytes");
const _: () = assert!(BUILD_WIFI_PASSWORD.len() <= 64, "WIFI_PASSWORD exceeds 64 bytes");
const _: () = assert!(BUILD_MQTT_BROKER.len() <= 64, "MQTT_BROKER exceeds 64 bytes");

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Identity ---
    /// Node identity, used to derive every topic name
    pub node_id: String<NODE_ID_MAX>,

    // --- Network ---
    /// WiFi network name (1-32 printable ASCII bytes)
    pub wifi_ssid: String<32>,
    /// WiFi passphrase (empty for open networks, else 8-64 bytes)
    pub wifi_password: String<64>,
    /// MQTT broker host name
    pub broker_host: String<64>,
    /// MQTT broker TCP port
    pub broker_port: u16,
    /// MQTT client buffer size in bytes
    pub mqtt_buffer_size: usize,

    // --- Timing ---
    /// Telemetry publish interval (milliseconds)
    pub publish_interval_ms: u32,
    /// Sweep servo step interval (milliseconds per degree)
    pub sweep_step_interval_ms: u32,
    /// Delay between broker session attempts (milliseconds)
    pub session_retry_delay_ms: u32,
    /// Delay before re-issuing a link connect while the link stays down
    pub link_retry_interval_ms: u32,

    // --- Automation ---
    /// Optional on-node climate rules
    pub automation: ClimateRules,
}

/// Threshold rules for local fan/sprinkler automation.
///
/// Evaluated against every published sensor sample when `enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateRules {
    pub enabled: bool,
    /// Fan runs while temperature is strictly above this (Celsius)
    pub fan_on_above_c: f32,
    /// Sprinkler runs while relative humidity is strictly below this (%)
    pub sprinkler_on_below_pct: f32,
}

impl Default for ClimateRules {
    fn default() -> Self {
        Self {
            enabled: false,
            fan_on_above_c: 28.0,
            sprinkler_on_below_pct: 40.0,
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Identity
            node_id: fixed(BUILD_NODE_ID),

            // Network
            wifi_ssid: fixed(BUILD_WIFI_SSID),
            wifi_password: fixed(BUILD_WIFI_PASSWORD),
            broker_host: fixed(BUILD_MQTT_BROKER),
            broker_port: 1883,
            mqtt_buffer_size: 512,

            // Timing
            publish_interval_ms: 2_000,     // 0.5 Hz
            sweep_step_interval_ms: 25,     // 40 deg/s
            session_retry_delay_ms: 5_000,  // broker retry spacing
            link_retry_interval_ms: 15_000, // WiFi re-kick

            automation: ClimateRules::default(),
        }
    }
}

/// Copy `s` into a fixed-capacity string.
///
/// A value that does not fit yields an empty string, never a truncated
/// one, so `validate()` rejects it.
fn fixed<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    if out.push_str(s).is_err() {
        out.clear();
    }
    out
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

impl NodeConfig {
    /// Reject values the node cannot run with.
    ///
    /// Invalid ranges are rejected, never silently clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let id = self.node_id.as_str();
        if id.is_empty() || !is_printable_ascii(id) {
            return Err(ConfigError::ValidationFailed("node_id must be printable ASCII"));
        }
        if id.contains(['/', '+', '#', ' ']) {
            return Err(ConfigError::ValidationFailed(
                "node_id must not contain topic separators or wildcards",
            ));
        }

        let ssid = self.wifi_ssid.as_str();
        if ssid.is_empty() || !is_printable_ascii(ssid) {
            return Err(ConfigError::ValidationFailed("wifi_ssid must be 1-32 printable ASCII bytes"));
        }
        let password = self.wifi_password.as_str();
        if !password.is_empty() && password.len() < 8 {
            return Err(ConfigError::ValidationFailed("wifi_password must be empty or 8-64 bytes"));
        }

        if self.broker_host.is_empty() {
            return Err(ConfigError::ValidationFailed("broker_host is empty"));
        }
        if self.broker_port == 0 {
            return Err(ConfigError::ValidationFailed("broker_port must be non-zero"));
        }
        if self.mqtt_buffer_size < 128 {
            return Err(ConfigError::ValidationFailed("mqtt_buffer_size below 128 bytes"));
        }

        if self.publish_interval_ms == 0
            || self.sweep_step_interval_ms == 0
            || self.session_retry_delay_ms == 0
            || self.link_retry_interval_ms == 0
        {
            return Err(ConfigError::ValidationFailed("intervals must be non-zero"));
        }

        let rules = &self.automation;
        if !rules.fan_on_above_c.is_finite() || !rules.sprinkler_on_below_pct.is_finite() {
            return Err(ConfigError::ValidationFailed("automation thresholds must be finite"));
        }
        if !(0.0..=100.0).contains(&rules.sprinkler_on_below_pct) {
            return Err(ConfigError::ValidationFailed("sprinkler threshold must be 0-100 %"));
        }
        Ok(())
    }
}
