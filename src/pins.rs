//! GPIO pin assignments for the greenhouse node (ESP32 DevKit).
//!
//! Single source of truth for pin numbers. `main` hands the matching
//! `esp_idf_hal` pin peripherals to the relay and door drivers; the DHT22
//! and servo are configured by number in `drivers::hw_init`.

// ── Sensors ───────────────────────────────────────────────────

/// DHT22 single-wire data line (open-drain, external pull-up).
pub const DHT_DATA_GPIO: i32 = 15;

/// Door reed switch. Input with internal pull-up: HIGH = door OPEN.
pub const DOOR_SWITCH_GPIO: i32 = 14;

// ── Actuators ─────────────────────────────────────────────────

/// Grow-light relay. HIGH = on.
pub const LIGHT_RELAY_GPIO: i32 = 13;

/// Sprinkler valve relay. HIGH = on.
pub const SPRINKLER_RELAY_GPIO: i32 = 23;

/// Fan louvre servo signal (LEDC PWM).
pub const SERVO_PWM_GPIO: i32 = 12;

// ── Servo PWM parameters ──────────────────────────────────────

/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC duty resolution for the servo channel.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Pulse width at 0 degrees.
pub const SERVO_MIN_PULSE_US: u32 = 544;
/// Pulse width at 180 degrees.
pub const SERVO_MAX_PULSE_US: u32 = 2400;
