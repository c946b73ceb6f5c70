//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the rules of the greenhouse node: command
//! decoding, actuator state, and the loop orchestration in [`service`].
//! All interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod state;
