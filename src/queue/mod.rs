//! Queue data: wire types, unit normalization, projection, export.

pub mod export;
pub mod types;
pub mod units;
pub mod view;
