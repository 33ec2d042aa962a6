//! Endpoint derivation from the configured service base URL.

use crate::core::errors::{QmError, Result};

/// Path of the push channel.
pub const STREAM_PATH: &str = "/api/ws";
/// Path of the one-shot snapshot request.
pub const SNAPSHOT_PATH: &str = "/api/queue-stats";

/// Resolved service endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// `ws://` or `wss://` URL of the streaming channel.
    pub stream_url: String,
    /// `http://` or `https://` URL of the snapshot request.
    pub snapshot_url: String,
}

impl Endpoints {
    /// Derive both endpoints; a secure origin (`https`) yields a secure stream (`wss`).
    pub fn from_base_url(base_url: &str) -> Result<Self> {
        let base = base_url.trim().trim_end_matches('/');
        let stream_origin = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            return Err(QmError::InvalidConfig {
                details: format!("cannot derive stream endpoint from {base_url:?}"),
            });
        };

        Ok(Self {
            stream_url: format!("{stream_origin}{STREAM_PATH}"),
            snapshot_url: format!("{base}{SNAPSHOT_PATH}"),
        })
    }
}
