//! RQM-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, QmError>;

/// Top-level error type for the queue monitor client.
#[derive(Debug, Error)]
pub enum QmError {
    #[error("[RQM-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[RQM-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[RQM-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[RQM-2001] HTTP {status}: {reason}")]
    Fetch { status: u16, reason: String },

    #[error("[RQM-2002] transport failure in {context}: {details}")]
    Transport {
        context: &'static str,
        details: String,
    },

    #[error("[RQM-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[RQM-2201] nothing to export: queue collection is empty")]
    NothingToExport,

    #[error("[RQM-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[RQM-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl QmError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "RQM-1001",
            Self::MissingConfig { .. } => "RQM-1002",
            Self::ConfigParse { .. } => "RQM-1003",
            Self::Fetch { .. } => "RQM-2001",
            Self::Transport { .. } => "RQM-2002",
            Self::Serialization { .. } => "RQM-2101",
            Self::NothingToExport => "RQM-2201",
            Self::Io { .. } => "RQM-3002",
            Self::Runtime { .. } => "RQM-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. }
                | Self::Transport { .. }
                | Self::Io { .. }
                | Self::Runtime { .. }
        )
    }

    /// Message suitable for a user-facing notification (no code prefix).
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch { status, reason } => format!("HTTP {status}: {reason}"),
            Self::Transport { details, .. } => details.clone(),
            other => other.to_string(),
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for QmError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for QmError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<reqwest::Error> for QmError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            context: "reqwest",
            details: value.to_string(),
        }
    }
}
