//! Connectivity state machine.
//!
//! Brings up the WiFi link and the broker session and restores them when
//! either drops. It is polled once per loop iteration through
//! [`ConnectivityManager::ensure_connected`] and never blocks, so the
//! sweep and telemetry clocks keep running during recovery.
//!
//! ```text
//!                 link down                     link up
//!  Disconnected ───────────▶ ConnectingLink ─────────────▶ ConnectingSession
//!        ▲                        ▲  │ re-kick every            │  ▲   attempt every
//!        │                        │  └ link_retry_interval      │  │   session_retry_delay
//!        │                        │ link lost                   │  │
//!        │                        └──────────── Connected ◀─────┘  │ session up + subscribed
//!        │                                        │                │
//!        └────────────────────────────────────────┴────────────────┘ session lost
//! ```
//!
//! Retries are unbounded: losing the network is a liveness concern, never
//! a fatal error.

use core::fmt::Write;

use heapless::String;
use log::{info, warn};

use crate::app::ports::{BrokerPort, EntropyPort, LinkPort};
use crate::config::NodeConfig;
use crate::topics::TopicString;

/// Client id prefix; the node id and a random suffix follow.
pub const CLIENT_ID_PREFIX: &str = "gh-client-";

/// `gh-client-` + 16-byte node id + `-` + up to 3 digits.
pub type ClientId = String<32>;

/// Coarse state, without timing data, for events and queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityPhase {
    Disconnected,
    ConnectingLink,
    ConnectingSession,
    Connected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Disconnected,
    /// Link connect issued at `since_ms`.
    ConnectingLink { since_ms: u64 },
    /// Link up. `next_attempt_ms` is when the next session attempt may
    /// start; `in_flight` is set while an accepted attempt is pending.
    ConnectingSession { next_attempt_ms: u64, in_flight: bool },
    Connected,
}

/// Counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectivityStats {
    pub link_connects: u32,
    pub session_attempts: u32,
    pub sessions_established: u32,
}

pub struct ConnectivityManager {
    state: State,
    node_id: String<16>,
    control_filter: TopicString,
    session_retry_delay_ms: u64,
    link_retry_interval_ms: u64,
    stats: ConnectivityStats,
}

impl ConnectivityManager {
    pub fn new(config: &NodeConfig, control_filter: TopicString) -> Self {
        Self {
            state: State::Disconnected,
            node_id: config.node_id.clone(),
            control_filter,
            session_retry_delay_ms: u64::from(config.session_retry_delay_ms),
            link_retry_interval_ms: u64::from(config.link_retry_interval_ms),
            stats: ConnectivityStats::default(),
        }
    }

    pub fn phase(&self) -> ConnectivityPhase {
        match self.state {
            State::Disconnected => ConnectivityPhase::Disconnected,
            State::ConnectingLink { .. } => ConnectivityPhase::ConnectingLink,
            State::ConnectingSession { .. } => ConnectivityPhase::ConnectingSession,
            State::Connected => ConnectivityPhase::Connected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state == State::Connected
    }

    pub fn stats(&self) -> ConnectivityStats {
        self.stats
    }

    /// Advance the state machine one step. Returns `true` when the broker
    /// session is up and subscribed.
    pub fn ensure_connected<N>(&mut self, now_ms: u64, net: &mut N) -> bool
    where
        N: LinkPort + BrokerPort + EntropyPort,
    {
        let current = self.state;
        self.state = match current {
            State::Disconnected => {
                if net.is_link_up() {
                    self.attempt_session(now_ms, net)
                } else {
                    self.kick_link(now_ms, net)
                }
            }
            State::ConnectingLink { since_ms } => {
                if net.is_link_up() {
                    info!("link: up");
                    self.attempt_session(now_ms, net)
                } else if now_ms.saturating_sub(since_ms) >= self.link_retry_interval_ms {
                    warn!("link: still down after {} ms, retrying", self.link_retry_interval_ms);
                    self.kick_link(now_ms, net)
                } else {
                    current
                }
            }
            State::ConnectingSession { next_attempt_ms, in_flight } => {
                if !net.is_link_up() {
                    warn!("link: lost while connecting to broker");
                    net.disconnect();
                    self.kick_link(now_ms, net)
                } else if net.is_connected() {
                    self.on_session_up(now_ms, net)
                } else if now_ms >= next_attempt_ms {
                    if in_flight {
                        warn!("broker: attempt timed out, try again");
                        net.disconnect();
                    }
                    self.attempt_session(now_ms, net)
                } else {
                    current
                }
            }
            State::Connected => {
                if !net.is_link_up() {
                    warn!("link: lost");
                    net.disconnect();
                    self.kick_link(now_ms, net)
                } else if !net.is_connected() {
                    warn!("broker: session lost, reconnecting");
                    net.disconnect();
                    self.attempt_session(now_ms, net)
                } else {
                    State::Connected
                }
            }
        };
        self.state == State::Connected
    }

    fn kick_link(&mut self, now_ms: u64, net: &mut impl LinkPort) -> State {
        self.stats.link_connects += 1;
        if let Err(e) = net.begin_connect() {
            warn!("link: connect request failed: {}", e);
        }
        State::ConnectingLink { since_ms: now_ms }
    }

    fn attempt_session<N>(&mut self, now_ms: u64, net: &mut N) -> State
    where
        N: BrokerPort + EntropyPort,
    {
        self.stats.session_attempts += 1;
        let client_id = self.client_id(net.next_u32());
        info!("broker: attempting connection as '{}'", client_id);
        let next_attempt_ms = now_ms.saturating_add(self.session_retry_delay_ms);
        match net.connect(&client_id) {
            Ok(()) if net.is_connected() => self.on_session_up(now_ms, net),
            Ok(()) => State::ConnectingSession {
                next_attempt_ms,
                in_flight: true,
            },
            Err(e) => {
                warn!("broker: {}, try again in {} ms", e, self.session_retry_delay_ms);
                State::ConnectingSession {
                    next_attempt_ms,
                    in_flight: false,
                }
            }
        }
    }

    fn on_session_up(&mut self, now_ms: u64, net: &mut impl BrokerPort) -> State {
        match net.subscribe(&self.control_filter) {
            Ok(()) => {
                self.stats.sessions_established += 1;
                info!("broker: connected, subscribed to '{}'", self.control_filter);
                State::Connected
            }
            Err(e) => {
                warn!("broker: {}, dropping session", e);
                net.disconnect();
                State::ConnectingSession {
                    next_attempt_ms: now_ms.saturating_add(self.session_retry_delay_ms),
                    in_flight: false,
                }
            }
        }
    }

    /// `gh-client-<id>-<n>` with `n` in `0..1000`.
    pub fn client_id(&self, entropy: u32) -> ClientId {
        let mut id = ClientId::new();
        let _ = write!(id, "{}{}-{}", CLIENT_ID_PREFIX, self.node_id, entropy % 1000);
        id
    }
}
