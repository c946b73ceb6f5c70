//! Inbound message mailbox.
//!
//! The MQTT client delivers subscribed messages from its own task. They
//! are pushed into an `embassy-sync` bounded channel and drained by the
//! node loop, which is the only consumer.
//!
//! ```text
//! ┌──────────────┐ InboundMessage ┌──────────────┐
//! │  MQTT task   │───────────────▶│   Node loop   │
//! │  (callback)  │                │   (sync)      │
//! └──────────────┘                └──────────────┘
//! ```
//!
//! A full mailbox drops the new message; the loop drains it every
//! iteration, so this only happens under a burst of more than
//! [`INBOX_DEPTH`] commands between two iterations.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};
use log::warn;

use crate::topics::MAX_TOPIC_LEN;

/// Channel depth for inbound messages.
pub const INBOX_DEPTH: usize = 8;

/// Largest command payload kept verbatim.
pub const MAX_PAYLOAD_LEN: usize = 256;

/// One message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<MAX_TOPIC_LEN>,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl InboundMessage {
    /// Copy a delivered message into fixed-capacity storage.
    ///
    /// Returns `None` if the topic does not fit. An over-long payload is
    /// replaced by an empty one, which decodes as OFF.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = String::new();
        t.push_str(topic).ok()?;
        let payload = Vec::from_slice(payload).unwrap_or_else(|()| {
            warn!("inbox: {}-byte payload on '{}' exceeds {} bytes", payload.len(), topic, MAX_PAYLOAD_LEN);
            Vec::new()
        });
        Some(Self { topic: t, payload })
    }
}

/// Bounded mailbox between the broker client and the node loop.
pub struct Inbox {
    channel: Channel<CriticalSectionRawMutex, InboundMessage, INBOX_DEPTH>,
    dropped: AtomicU32,
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Inbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue a delivered message. Returns `false` if it was dropped.
    pub fn deliver(&self, topic: &str, payload: &[u8]) -> bool {
        let Some(msg) = InboundMessage::new(topic, payload) else {
            warn!("inbox: topic longer than {} bytes dropped", MAX_TOPIC_LEN);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        };
        if self.channel.try_send(msg).is_err() {
            warn!("inbox: full, dropping message on '{}'", topic);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Dequeue the oldest pending message.
    pub fn take(&self) -> Option<InboundMessage> {
        self.channel.try_receive().ok()
    }

    /// Discard everything pending. Returns how many messages were dropped.
    ///
    /// Called whenever a broker session ends, so messages from a dead
    /// session never reach the next one.
    pub fn clear(&self) -> usize {
        let mut n = 0;
        while self.channel.try_receive().is_ok() {
            n += 1;
        }
        n
    }

    /// Messages dropped since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}
