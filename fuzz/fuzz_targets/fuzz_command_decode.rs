//! Fuzz target: control message decoding
//!
//! Splits the input into a topic and a payload and runs both through the
//! node's inbound path: inbox admission, topic filter and command decode.
//! None of it may panic, and an admitted message must stay within the
//! inbox limits.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use greenhouse_node::app::commands::decode;
use greenhouse_node::inbox::{InboundMessage, MAX_PAYLOAD_LEN};
use greenhouse_node::topics::{filter_matches, MAX_TOPIC_LEN};
use libfuzzer_sys::fuzz_target;

const FILTER: &str = "ucsi/mdt1001/greenhouse/gh1/control/#";

fuzz_target!(|data: &[u8]| {
    let split = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let (topic, payload) = data.split_at(split);
    let Ok(topic) = core::str::from_utf8(topic) else {
        return;
    };
    let payload = payload.get(1..).unwrap_or_default();

    let _ = filter_matches(FILTER, topic);
    let _ = decode(topic, payload);

    if let Some(msg) = InboundMessage::new(topic, payload) {
        assert!(msg.topic.len() <= MAX_TOPIC_LEN);
        assert!(msg.payload.len() <= MAX_PAYLOAD_LEN);
        let _ = decode(&msg.topic, &msg.payload);
    }
});
