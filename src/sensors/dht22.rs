//! DHT22 (AM2302) temperature / relative humidity sensor.
//!
//! Single-wire protocol: the host pulls the line low for >1 ms, releases
//! it, and the sensor answers with an 80 µs low / 80 µs high preamble
//! followed by 40 data bits. Each bit is a ~50 µs low followed by a high
//! pulse of ~27 µs (0) or ~70 µs (1). The frame is
//!
//! ```text
//! [RH hi][RH lo][T hi][T lo][checksum]   RH, T in tenths; T bit 15 = sign
//! ```
//!
//! The sensor must not be sampled more than once every 2 s; reads inside
//! that window return the previous result.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-bangs GPIO15 inside a critical section.
//! On host/test: builds frames from static atomics for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::warn;

use crate::error::SensorError;
use crate::telemetry::SensorSample;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Minimum spacing between two bus transactions.
pub const MIN_SAMPLE_INTERVAL_MS: u64 = 2_000;

const TEMP_MIN_C: f32 = -40.0;
const TEMP_MAX_C: f32 = 80.0;

// ── Simulation injection ──────────────────────────────────────

/// Humidity tenths in the high half, signed temperature tenths in the low half.
#[cfg(not(target_os = "espidf"))]
static SIM_READING: AtomicU32 = AtomicU32::new(pack_sim(215, 550));
#[cfg(not(target_os = "espidf"))]
static SIM_FAIL: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
const fn pack_sim(temp_tenths: i16, humidity_tenths: u16) -> u32 {
    ((humidity_tenths as u32) << 16) | (temp_tenths as u16 as u32)
}

/// Set the reading the simulated sensor returns.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_reading(temperature_c: f32, humidity_pct: f32) {
    let t = (temperature_c * 10.0).round() as i16;
    let h = (humidity_pct * 10.0).round() as u16;
    SIM_READING.store(pack_sim(t, h), Ordering::Relaxed);
}

/// Make the simulated sensor time out until cleared.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_failure(fail: bool) {
    SIM_FAIL.store(fail, Ordering::Relaxed);
}

// ── Frame decoding ────────────────────────────────────────────

/// Decode and validate one 5-byte frame.
pub fn decode_frame(frame: [u8; 5]) -> Result<SensorSample, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let humidity = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
    let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) / 10.0;
    let temperature = if frame[2] & 0x80 != 0 { -magnitude } else { magnitude };

    if humidity > 100.0 || !(TEMP_MIN_C..=TEMP_MAX_C).contains(&temperature) {
        return Err(SensorError::OutOfRange);
    }
    Ok(SensorSample::new(temperature, humidity))
}

// ── Driver ────────────────────────────────────────────────────

pub struct Dht22 {
    gpio: i32,
    last_attempt_ms: Option<u64>,
    last_sample: SensorSample,
}

impl Dht22 {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            last_attempt_ms: None,
            last_sample: SensorSample::invalid(),
        }
    }

    /// Sample the sensor, or return the previous result if the last bus
    /// transaction was less than [`MIN_SAMPLE_INTERVAL_MS`] ago.
    ///
    /// Failures come back as an invalid sample.
    pub fn read(&mut self, now_ms: u64) -> SensorSample {
        if let Some(last) = self.last_attempt_ms {
            if now_ms.saturating_sub(last) < MIN_SAMPLE_INTERVAL_MS {
                return self.last_sample;
            }
        }
        self.last_attempt_ms = Some(now_ms);
        self.last_sample = match self.read_frame().and_then(decode_frame) {
            Ok(sample) => sample,
            Err(e) => {
                warn!("DHT22 on GPIO{}: {}", self.gpio, e);
                SensorSample::invalid()
            }
        };
        self.last_sample
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_frame(&self) -> Result<[u8; 5], SensorError> {
        if SIM_FAIL.load(Ordering::Relaxed) {
            return Err(SensorError::Timeout);
        }
        let packed = SIM_READING.load(Ordering::Relaxed);
        let [h_hi, h_lo] = ((packed >> 16) as u16).to_be_bytes();
        let t = packed as u16 as i16;
        let [mut t_hi, t_lo] = t.unsigned_abs().to_be_bytes();
        if t < 0 {
            t_hi |= 0x80;
        }
        let sum = h_hi.wrapping_add(h_lo).wrapping_add(t_hi).wrapping_add(t_lo);
        Ok([h_hi, h_lo, t_hi, t_lo, sum])
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&self) -> Result<[u8; 5], SensorError> {
        let pin = self.gpio;

        // Start signal: hold low > 1 ms, then release.
        hw_init::gpio_write(pin, false);
        hw_init::delay_us(1_200);

        critical_section::with(|_| {
            hw_init::gpio_write(pin, true);

            // Preamble: line released high, sensor pulls low ~80 µs, high ~80 µs.
            wait_while(pin, true, 100)?;
            wait_while(pin, false, 100)?;
            wait_while(pin, true, 100)?;

            let mut frame = [0u8; 5];
            for bit in 0..40 {
                wait_while(pin, false, 80)?;
                let high_us = wait_while(pin, true, 100)?;
                if high_us > 40 {
                    frame[bit / 8] |= 0x80 >> (bit % 8);
                }
            }
            Ok(frame)
        })
    }
}

/// Spin while the line reads `level`. Returns how long it took.
#[cfg(target_os = "espidf")]
fn wait_while(pin: i32, level: bool, timeout_us: u64) -> Result<u64, SensorError> {
    let start = hw_init::micros();
    while hw_init::gpio_read(pin) == level {
        let elapsed = hw_init::micros() - start;
        if elapsed > timeout_us {
            return Err(SensorError::Timeout);
        }
    }
    Ok(hw_init::micros() - start)
}
