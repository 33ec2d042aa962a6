//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use routeros_queue_monitor::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{QmError, Result};

// Queue data
pub use crate::queue::export::ExportDocument;
pub use crate::queue::types::{Queue, QueueSnapshot, StreamMessage, SystemStats};
pub use crate::queue::units::{format_bytes, format_rate, parse_rate_to_mbps};
pub use crate::queue::view::{Filter, SortKey, Status, ViewMode, project};

// Stream
pub use crate::stream::connection::{ConnectionManager, ConnectionState, ReconnectPolicy};
pub use crate::stream::endpoints::Endpoints;
pub use crate::stream::snapshot::SnapshotLoader;
