//! Terminal dashboard: Elm-style model/update/render plus the event loop.

#![allow(missing_docs)]

pub mod input;
pub mod model;
pub mod notifications;
pub mod render;
pub mod runtime;
pub mod terminal_guard;
pub mod theme;
pub mod update;

#[cfg(test)]
mod test_properties;

pub use runtime::run_dashboard;
