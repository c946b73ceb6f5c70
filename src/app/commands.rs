//! Inbound control commands.
//!
//! A remote controller publishes `{"command": "ON"}` (or anything else,
//! which means off) to `.../control/<actuator>`. [`decode`] turns one
//! such message into a [`Command`] that the
//! [`NodeService`](super::service::NodeService) applies.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// The three remotely switchable outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuator {
    Light,
    Fan,
    Sprinkler,
}

impl Actuator {
    pub const ALL: [Self; 3] = [Self::Light, Self::Fan, Self::Sprinkler];

    /// Topic leaf under `control/`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Fan => "fan",
            Self::Sprinkler => "sprinkler",
        }
    }

    /// Resolve the actuator addressed by a control topic.
    ///
    /// Only the last two levels are inspected: `<anything>/control/<leaf>`.
    pub fn from_topic(topic: &str) -> Option<Self> {
        let mut levels = topic.rsplit('/');
        let leaf = levels.next()?;
        if levels.next()? != "control" {
            return None;
        }
        Self::ALL.into_iter().find(|a| a.as_str() == leaf)
    }
}

/// On/off value as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Switch {
    #[serde(rename = "ON")]
    On,
    #[default]
    #[serde(rename = "OFF")]
    Off,
}

impl Switch {
    pub const fn from_bool(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }

    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

/// A decoded control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub target: Actuator,
    pub value: Switch,
}

impl Command {
    pub const fn new(target: Actuator, value: Switch) -> Self {
        Self { target, value }
    }
}

#[derive(Deserialize)]
struct CommandPayload<'a> {
    #[serde(borrow, default)]
    command: Option<Cow<'a, str>>,
}

/// Decode one inbound control message.
///
/// Returns `None` when the topic addresses no known actuator. Otherwise
/// the value is [`Switch::On`] only for a JSON object whose `command`
/// field is exactly `"ON"`; a missing field, any other value, or a
/// payload that does not parse all mean [`Switch::Off`].
pub fn decode(topic: &str, payload: &[u8]) -> Option<Command> {
    let target = Actuator::from_topic(topic)?;
    let value = match serde_json::from_slice::<CommandPayload<'_>>(payload) {
        Ok(CommandPayload { command: Some(c) }) if c == "ON" => Switch::On,
        _ => Switch::Off,
    };
    Some(Command::new(target, value))
}
