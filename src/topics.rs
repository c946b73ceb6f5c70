//! MQTT topic layout.
//!
//! Every topic is derived from the node identity:
//!
//! ```text
//! ucsi/mdt1001/greenhouse/<id>/control/#                 (subscribe)
//! ucsi/mdt1001/greenhouse/<id>/control/{light,fan,sprinkler}
//! ucsi/mdt1001/greenhouse/<id>/telemetry/environment     (publish)
//! ucsi/mdt1001/greenhouse/<id>/telemetry/status          (publish)
//! ```

use core::fmt::Write;

use heapless::String;

use crate::app::commands::Actuator;

/// Topic prefix shared by every greenhouse.
pub const TOPIC_ROOT: &str = "ucsi/mdt1001/greenhouse";

/// Upper bound on any topic this node produces or accepts.
pub const MAX_TOPIC_LEN: usize = 128;

pub type TopicString = String<MAX_TOPIC_LEN>;

/// The concrete topics of one node, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub control_filter: TopicString,
    pub environment: TopicString,
    pub status: TopicString,
}

impl Topics {
    pub fn for_node(node_id: &str) -> Self {
        Self {
            control_filter: node_topic(node_id, "control/#"),
            environment: node_topic(node_id, "telemetry/environment"),
            status: node_topic(node_id, "telemetry/status"),
        }
    }

    /// Topic a remote controller publishes to for `actuator`.
    pub fn control(node_id: &str, actuator: Actuator) -> TopicString {
        let mut leaf: String<24> = String::new();
        let _ = write!(leaf, "control/{}", actuator.as_str());
        node_topic(node_id, &leaf)
    }
}

fn node_topic(node_id: &str, leaf: &str) -> TopicString {
    let mut t = TopicString::new();
    // Node ids are capped at 16 bytes, so this cannot overflow.
    let _ = write!(t, "{TOPIC_ROOT}/{node_id}/{leaf}");
    t
}

/// MQTT topic-filter match (`+` single level, `#` trailing multi level).
pub fn filter_matches(filter: &str, topic: &str) -> bool {
    let mut f = filter.split('/');
    let mut t = topic.split('/');
    loop {
        match (f.next(), t.next()) {
            (Some("#"), _) => return f.next().is_none(),
            (Some("+"), Some(_)) => {}
            (Some(fl), Some(tl)) if fl == tl => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
