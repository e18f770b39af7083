//! Round event publication.
//!
//! - `broadcast`: in-process fan-out over `tokio::sync::broadcast`

pub mod broadcast;

pub use broadcast::BroadcastRoundPusher;
