//! Streaming-channel lifecycle: connection state, bounded linear reconnect,
//! and inbound frame decoding.
//!
//! The manager is a pure state machine. The runtime owns the actual socket
//! task and timers; it reports lifecycle events here and acts on the
//! [`ReconnectPlan`] that comes back. Every connect attempt carries a
//! generation number so events from a superseded socket can be discarded.

#![allow(missing_docs)]

use std::time::Duration;

use crate::core::config::StreamConfig;
use crate::queue::types::{QueueSnapshot, StreamMessage};

// ──────────────────── policy ────────────────────

/// Linear backoff: attempt `n` waits `n * base_delay`, up to `max_attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(2_000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    #[must_use]
    pub const fn from_config(cfg: &StreamConfig) -> Self {
        Self {
            base_delay: cfg.reconnect_base_delay(),
            max_attempts: cfg.max_reconnect_attempts,
        }
    }

    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// A reconnect the runtime should schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPlan {
    /// 1-based attempt number.
    pub attempt: u32,
    pub delay: Duration,
}

// ──────────────────── state ────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Closed, with reconnect attempt `attempt` scheduled.
    Reconnecting { attempt: u32 },
    /// Closed after the attempt cap; only an explicit signal reconnects.
    Exhausted,
}

impl ConnectionState {
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Outcome of decoding one inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Wholesale replacement of the queue collection.
    Update(QueueSnapshot),
    /// Server-reported error to surface as a notification.
    ServerError(String),
    /// Recognized but irrelevant (`pong`, unknown tags).
    Ignored,
    /// Not valid JSON or not a tagged message; dropped.
    Malformed(String),
}

/// Decode a text frame from the streaming channel.
#[must_use]
pub fn decode_frame(text: &str) -> FrameOutcome {
    match serde_json::from_str::<StreamMessage>(text) {
        Ok(StreamMessage::QueueUpdate { data }) => FrameOutcome::Update(data),
        Ok(StreamMessage::Error { message }) => FrameOutcome::ServerError(message),
        Ok(StreamMessage::Unknown) => FrameOutcome::Ignored,
        Err(error) => FrameOutcome::Malformed(error.to_string()),
    }
}

// ──────────────────── manager ────────────────────

#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    policy: ReconnectPolicy,
    state: ConnectionState,
    attempts: u32,
    generation: u64,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Reconnect attempts consumed since the last successful open.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    /// Start a new connect attempt and return its generation.
    ///
    /// The attempt counter is left alone; only a successful open resets it.
    pub fn on_connect_requested(&mut self) -> u64 {
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        self.generation
    }

    /// Whether an event tagged with `generation` belongs to the live socket.
    #[must_use]
    pub const fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Socket opened. Returns `false` when the event is stale.
    pub fn on_open(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.attempts = 0;
        self.state = ConnectionState::Connected;
        true
    }

    /// Socket closed, or could not be constructed.
    ///
    /// Returns the reconnect to schedule, or `None` once attempts are
    /// exhausted (or the event is stale).
    pub fn on_close(&mut self, generation: u64) -> Option<ReconnectPlan> {
        if !self.is_current(generation) {
            return None;
        }
        self.state = ConnectionState::Disconnected;
        if self.attempts >= self.policy.max_attempts {
            self.state = ConnectionState::Exhausted;
            return None;
        }
        self.attempts += 1;
        self.state = ConnectionState::Reconnecting {
            attempt: self.attempts,
        };
        Some(ReconnectPlan {
            attempt: self.attempts,
            delay: self.policy.delay_for(self.attempts),
        })
    }

    /// Header indicator text.
    #[must_use]
    pub fn indicator(&self) -> String {
        match self.state {
            ConnectionState::Connected => "Connected".to_string(),
            ConnectionState::Connecting => "Connecting".to_string(),
            ConnectionState::Reconnecting { attempt } => format!(
                "Disconnected (reconnect {attempt}/{})",
                self.policy.max_attempts
            ),
            ConnectionState::Disconnected | ConnectionState::Exhausted => {
                "Disconnected".to_string()
            }
        }
    }
}
