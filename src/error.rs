//! Unified error types for the greenhouse node firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the bootstrap path's error handling uniform. All variants are `Copy`
//! so they can be passed through the node loop without allocation.

use core::fmt;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// A network link or broker operation failed.
    Comms(CommsError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The sensor did not answer the start signal or stalled mid-frame.
    Timeout,
    /// Frame checksum did not match the data bytes.
    ChecksumMismatch,
    /// Reading is outside the sensor's rated range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "sensor timed out"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// WiFi credentials were rejected by the driver.
    WifiConfigFailed,
    /// The WiFi driver refused to start a connection.
    WifiConnectFailed,
    /// The network link is not up.
    LinkDown,
    /// The broker refused or dropped the session request.
    SessionRefused(i32),
    /// There is no broker session to operate on.
    NotConnected,
    /// The control-topic subscription was not accepted.
    SubscribeFailed,
    /// A publish could not be enqueued.
    PublishFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConfigFailed => write!(f, "WiFi configuration rejected"),
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::LinkDown => write!(f, "network link down"),
            Self::SessionRefused(rc) => write!(f, "broker session refused (rc={rc})"),
            Self::NotConnected => write!(f, "no broker session"),
            Self::SubscribeFailed => write!(f, "MQTT subscribe failed"),
            Self::PublishFailed => write!(f, "MQTT publish failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}
