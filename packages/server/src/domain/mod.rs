//! Domain layer: the seams the use cases depend on.
//!
//! Round records themselves live in `roundfeed_shared::round` because the
//! client reads the same type.

mod error;
mod repository;
mod round_pusher;

pub use error::{PushError, RepositoryError};
pub use repository::RoundRepository;
pub use round_pusher::{PushChannel, RoundPusher};

#[cfg(test)]
pub use repository::MockRoundRepository;
