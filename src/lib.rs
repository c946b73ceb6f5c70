//! Greenhouse node firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod automation;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod inbox;
pub mod pins;
pub mod scheduler;
pub mod sweep;
pub mod telemetry;
pub mod topics;

// ESP-IDF-backed modules; the implementations are cfg-gated inside and
// fall back to simulation stubs on the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
