#![forbid(unsafe_code)]

//! RouterOS Queue Monitor (rqm): a live terminal dashboard for queue-tree
//! utilization reported by a RouterOS monitoring service.
//!
//! Data flows in two ways:
//! 1. **Stream**: a WebSocket pushes `queue_update` frames as they happen
//! 2. **Snapshot**: an HTTP endpoint returns the full collection on demand
//!
//! Both feed the same model; filtering, searching, and sorting only ever
//! change what is shown, never the collection itself.
//!
//! # Library usage
//!
//! ```rust,no_run
//! use routeros_queue_monitor::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use routeros_queue_monitor::core::config::Config;
//! use routeros_queue_monitor::queue::view::{Filter, SortKey, project};
//! ```

pub mod prelude;

pub mod core;
pub mod queue;
pub mod stream;
#[cfg(feature = "tui")]
pub mod tui;
