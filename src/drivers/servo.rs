//! Hobby servo driver for the fan louvre.
//!
//! Maps 0–180° linearly onto a 544–2400 µs pulse inside a 20 ms frame
//! and writes it as a 14-bit LEDC duty via hw_init.

use crate::app::state::SWEEP_MAX_DEG;
use crate::drivers::hw_init;
use crate::pins;

const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
const DUTY_MAX: u32 = 1 << pins::SERVO_PWM_RESOLUTION_BITS;

/// Pulse width for `degrees` (clamped to 0–180).
pub const fn pulse_us(degrees: u8) -> u32 {
    let deg = (if degrees > SWEEP_MAX_DEG { SWEEP_MAX_DEG } else { degrees }) as u32;
    pins::SERVO_MIN_PULSE_US
        + (pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US) * deg / SWEEP_MAX_DEG as u32
}

/// LEDC duty value for `degrees`.
pub const fn angle_to_duty(degrees: u8) -> u32 {
    pulse_us(degrees) * DUTY_MAX / FRAME_US
}

pub struct ServoDriver {
    angle: Option<u8>,
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver {
    pub fn new() -> Self {
        Self { angle: None }
    }

    pub fn set_angle(&mut self, degrees: u8) {
        let degrees = degrees.min(SWEEP_MAX_DEG);
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, angle_to_duty(degrees));
        self.angle = Some(degrees);
    }

    /// Last commanded angle, `None` before the first write.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}
