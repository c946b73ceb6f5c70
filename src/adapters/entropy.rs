//! Random numbers for broker client ids.
//!
//! On ESP-IDF the hardware RNG (`esp_random`) is used. On the host a
//! seeded xorshift32 gives reproducible ids in tests.

use crate::app::ports::EntropyPort;

pub struct EntropySource {
    #[cfg(not(target_os = "espidf"))]
    state: u32,
}

impl Default for EntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self::seeded(0x9E37_79B9)
    }

    /// Deterministic sequence for simulation. A zero seed is bumped to 1.
    #[cfg(not(target_os = "espidf"))]
    pub fn seeded(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }
}

impl EntropyPort for EntropySource {
    #[cfg(target_os = "espidf")]
    fn next_u32(&mut self) -> u32 {
        // SAFETY: esp_random reads the hardware RNG register.
        unsafe { esp_idf_sys::esp_random() }
    }

    #[cfg(not(target_os = "espidf"))]
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}
