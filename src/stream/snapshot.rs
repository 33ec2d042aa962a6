//! One-shot HTTP snapshot of the full queue state.

#![allow(missing_docs)]

use std::time::Duration;

use crate::core::errors::{QmError, Result};
use crate::queue::types::{QueueSnapshot, SnapshotBody};

/// Fetches `GET /api/queue-stats`.
#[derive(Debug, Clone)]
pub struct SnapshotLoader {
    client: reqwest::Client,
    url: String,
}

impl SnapshotLoader {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| QmError::Transport {
                context: "http client",
                details: error.to_string(),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and decode one snapshot.
    ///
    /// `Ok(None)` means the service answered 2xx with a body that carries no
    /// queue collection; callers apply nothing in that case.
    pub async fn load(&self) -> Result<Option<QueueSnapshot>> {
        tracing::debug!(url = %self.url, "requesting queue snapshot");
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "snapshot request rejected");
            return Err(QmError::Fetch {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        parse_snapshot_body(&body)
    }
}

/// Decode a snapshot response body.
pub fn parse_snapshot_body(body: &str) -> Result<Option<QueueSnapshot>> {
    let parsed: SnapshotBody = serde_json::from_str(body)?;
    Ok(parsed.into_snapshot())
}
