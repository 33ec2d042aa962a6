//! User-triggered JSON export of the current queue collection.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::core::errors::{QmError, Result};
use crate::queue::types::{Queue, SystemStats};
use crate::queue::units::{format_bytes, format_rate, format_utilization};
use crate::queue::view::{Status, average_utilization, high_utilization_count};

/// Filename prefix shared by every export document.
pub const EXPORT_FILE_PREFIX: &str = "routeros-queue-monitor-";

/// One queue reduced to its display values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedQueue {
    pub name: String,
    pub current_rate: String,
    pub max_limit: String,
    pub utilization: String,
    pub total_bytes: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub total_queues: usize,
    pub high_utilization_queues: usize,
    pub average_utilization: String,
}

/// The downloadable document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportDocument {
    pub timestamp: String,
    pub export_time: String,
    #[serde(rename = "systemStats")]
    pub system_stats: SystemStats,
    pub queues: Vec<ExportedQueue>,
    pub summary: ExportSummary,
    #[serde(skip)]
    file_stamp: String,
}

impl ExportDocument {
    /// Build a document from the full (unfiltered) collection.
    ///
    /// An empty collection is refused; there is no partial export.
    pub fn build(queues: &[Queue], stats: &SystemStats, now: DateTime<Local>) -> Result<Self> {
        let average = average_utilization(queues).ok_or(QmError::NothingToExport)?;
        let utc = now.with_timezone(&Utc);

        let exported = queues
            .iter()
            .map(|q| ExportedQueue {
                name: q.name.clone(),
                current_rate: format_rate(&q.rate),
                max_limit: format_rate(&q.max_limit),
                utilization: format_utilization(q.utilization),
                total_bytes: format_bytes(q.bytes),
                status: Status::from_utilization(q.utilization).label().to_string(),
            })
            .collect();

        Ok(Self {
            timestamp: utc.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            export_time: now.format("%Y/%-m/%-d %H:%M:%S").to_string(),
            system_stats: stats.clone(),
            queues: exported,
            summary: ExportSummary {
                total_queues: queues.len(),
                high_utilization_queues: high_utilization_count(queues),
                average_utilization: format_utilization(average),
            },
            file_stamp: utc.format("%Y-%m-%dT%H-%M-%S").to_string(),
        })
    }

    /// `routeros-queue-monitor-<ISO timestamp, colons as hyphens>.json`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{EXPORT_FILE_PREFIX}{}.json", self.file_stamp)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document into `dir`, returning the full path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|source| QmError::io(dir, source))?;
        let path = dir.join(self.file_name());
        let body = self.to_json()?;
        fs::write(&path, body).map_err(|source| QmError::io(&path, source))?;
        Ok(path)
    }
}
