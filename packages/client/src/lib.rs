//! Client side of roundfeed: a shared WebSocket connection pool and the round
//! countdown clock that game screens render every second.
//!
//! - [`pool`]: one connection per namespace, reference counted
//! - [`clock`]: pure derivation of countdowns and phase from a round record
//! - [`ticker`]: cancellable per-second recomputation
//! - [`view`]: a game screen's scoped hold on both

pub mod clock;
pub mod command;
pub mod error;
pub mod formatter;
pub mod pool;
pub mod session;
pub mod ticker;
pub mod ui;
pub mod view;

pub use error::ClientError;
