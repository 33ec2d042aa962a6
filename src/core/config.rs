//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{QmError, Result};
use crate::queue::view::{Filter, SortKey, ViewMode};

/// Full client configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub stream: StreamConfig,
    pub dashboard: DashboardConfig,
    pub notifications: NotificationConfig,
    pub export: ExportConfig,
    pub paths: PathsConfig,
}

/// Upstream monitoring service location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the monitoring service (`http://` or `https://`).
    /// The streaming endpoint is derived from it with a matching `ws`/`wss` scheme.
    pub base_url: String,
    pub request_timeout_ms: u64,
}

/// Streaming channel lifecycle knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StreamConfig {
    /// Linear backoff unit: attempt `n` waits `n * reconnect_base_delay_ms`.
    pub reconnect_base_delay_ms: u64,
    /// Automatic reconnect attempts before giving up.
    pub max_reconnect_attempts: u32,
    /// Interval between reachability probes feeding online/offline signals.
    pub probe_interval_ms: u64,
}

/// Initial view state and input timing for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardConfig {
    pub view: ViewMode,
    pub filter: Filter,
    pub sort: SortKey,
    pub search_debounce_ms: u64,
    pub splash_ms: u64,
}

/// Toast lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationConfig {
    pub display_ms: u64,
    pub exit_ms: u64,
}

/// Where export documents are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

/// Filesystem paths used by rqm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub log_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect_base_delay_ms: 2_000,
            max_reconnect_attempts: 5,
            probe_interval_ms: 5_000,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            view: ViewMode::Grid,
            filter: Filter::All,
            sort: SortKey::Name,
            search_debounce_ms: 300,
            splash_ms: 2_000,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_ms: 5_000,
            exit_ms: 300,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!("[RQM-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        Self {
            config_file: home_dir.join(".config").join("rqm").join("config.toml"),
            log_file: home_dir
                .join(".local")
                .join("share")
                .join("rqm")
                .join("rqm.log"),
        }
    }
}

impl StreamConfig {
    #[must_use]
    pub const fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    #[must_use]
    pub const fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| QmError::Io {
                path: path_buf.clone(),
                source,
            })?;
            toml::from_str::<Self>(&raw)?
        } else if is_explicit_path {
            return Err(QmError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Replace the server base URL (CLI `--server` takes precedence over file and env).
    pub fn override_server(&mut self, base_url: &str) -> Result<()> {
        self.server.base_url = base_url.to_string();
        self.normalize();
        self.validate()
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("RQM_SERVER_URL") {
            self.server.base_url = raw;
        }
        if let Some(raw) = lookup("RQM_SERVER_REQUEST_TIMEOUT_MS") {
            self.server.request_timeout_ms = parse_env("RQM_SERVER_REQUEST_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("RQM_STREAM_RECONNECT_BASE_DELAY_MS") {
            self.stream.reconnect_base_delay_ms =
                parse_env("RQM_STREAM_RECONNECT_BASE_DELAY_MS", &raw)?;
        }
        if let Some(raw) = lookup("RQM_STREAM_MAX_RECONNECT_ATTEMPTS") {
            self.stream.max_reconnect_attempts =
                parse_env("RQM_STREAM_MAX_RECONNECT_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = lookup("RQM_STREAM_PROBE_INTERVAL_MS") {
            self.stream.probe_interval_ms = parse_env("RQM_STREAM_PROBE_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("RQM_DASHBOARD_SEARCH_DEBOUNCE_MS") {
            self.dashboard.search_debounce_ms =
                parse_env("RQM_DASHBOARD_SEARCH_DEBOUNCE_MS", &raw)?;
        }
        if let Some(raw) = lookup("RQM_EXPORT_DIR") {
            self.export.directory = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("RQM_LOG_FILE") {
            self.paths.log_file = PathBuf::from(raw);
        }
        Ok(())
    }

    fn normalize(&mut self) {
        let trimmed = self.server.base_url.trim().trim_end_matches('/');
        self.server.base_url = trimmed.to_string();
    }

    fn validate(&self) -> Result<()> {
        let url = &self.server.base_url;
        let Some(rest) = url
            .strip_prefix("http://")
            .or_else(|| url.strip_prefix("https://"))
        else {
            return Err(QmError::InvalidConfig {
                details: format!("server.base_url must start with http:// or https://, got {url:?}"),
            });
        };
        if rest.is_empty() || rest.starts_with('/') {
            return Err(QmError::InvalidConfig {
                details: "server.base_url is missing a host".to_string(),
            });
        }
        if self.server.request_timeout_ms == 0 {
            return Err(QmError::InvalidConfig {
                details: "server.request_timeout_ms must be > 0".to_string(),
            });
        }
        if self.stream.reconnect_base_delay_ms == 0 {
            return Err(QmError::InvalidConfig {
                details: "stream.reconnect_base_delay_ms must be > 0".to_string(),
            });
        }
        if self.stream.max_reconnect_attempts == 0 {
            return Err(QmError::InvalidConfig {
                details: "stream.max_reconnect_attempts must be >= 1".to_string(),
            });
        }
        if self.stream.probe_interval_ms == 0 {
            return Err(QmError::InvalidConfig {
                details: "stream.probe_interval_ms must be > 0".to_string(),
            });
        }
        if self.notifications.display_ms == 0 {
            return Err(QmError::InvalidConfig {
                details: "notifications.display_ms must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| QmError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
