//! Round repository trait.
//!
//! Concrete storage lives in the infrastructure layer.

use async_trait::async_trait;
use roundfeed_shared::round::{RoundId, RoundRecord};

use super::RepositoryError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoundRepository: Send + Sync {
    /// Store a new round and make it the current round of `namespace`
    async fn save(&self, namespace: &str, round: RoundRecord) -> Result<(), RepositoryError>;

    /// Look up a round by id
    async fn get(&self, round_id: &RoundId) -> Result<Option<RoundRecord>, RepositoryError>;

    /// Latest round of `namespace`
    async fn current(&self, namespace: &str) -> Result<Option<RoundRecord>, RepositoryError>;
}
