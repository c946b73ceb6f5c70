//! Fuzz target: DHT22 frame decoding
//!
//! Any 5-byte frame either fails validation or yields a sample inside
//! the sensor's physical range.
//!
//! cargo fuzz run fuzz_dht22_frame

#![no_main]

use greenhouse_node::sensors::dht22::decode_frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|frame: [u8; 5]| {
    if let Ok(sample) = decode_frame(frame) {
        assert!(sample.is_valid());
        assert!((-40.0..=80.0).contains(&sample.temperature_c));
        assert!((0.0..=100.0).contains(&sample.humidity_pct));
    }
});
