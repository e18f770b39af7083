//! WebSocket message DTOs pushed by the round feed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::round::{RoundId, RoundRecord};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("Malformed round event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Events a feed pushes to subscribers of a namespace.
///
/// Encoded as JSON text frames tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RoundEvent {
    /// A new round began; supersedes any previous record for the namespace
    RoundStarted { round: RoundRecord },
    /// The round with this id is over
    RoundEnded { round_id: RoundId },
}

impl RoundEvent {
    pub fn from_json(text: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }
}
