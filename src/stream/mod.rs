//! Live data plumbing: streaming channel, snapshot fetch, reachability.

pub mod connection;
pub mod endpoints;
pub mod network;
pub mod snapshot;
pub mod transport;
