//! Development round feed for roundfeed.
//!
//! Runs back-to-back rounds for a set of tables, pushes `round-started` /
//! `round-ended` events to WebSocket subscribers of each table's namespace,
//! and serves round records by id over HTTP.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod app;
pub mod scheduler;
