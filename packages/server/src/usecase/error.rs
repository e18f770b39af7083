//! UseCase errors.

use roundfeed_shared::round::RoundRecordError;
use thiserror::Error;

use crate::domain::{PushError, RepositoryError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartRoundError {
    #[error("Invalid round: {0}")]
    InvalidRound(#[from] RoundRecordError),

    #[error("Failed to store round: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Failed to publish round: {0}")]
    Push(#[from] PushError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoundError {
    #[error("Round not found")]
    RoundNotFound,

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}
