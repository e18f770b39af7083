//! UseCase: start a new round on a table.
//!
//! ### What is tested
//! - A valid round is stamped with the clock, stored and published
//! - An invalid duration pair is rejected before anything is stored
//! - A storage failure is reported and nothing is published

use std::sync::Arc;

use roundfeed_shared::{
    round::{GameType, RoundId, RoundRecord},
    time::Clock,
    wire::RoundEvent,
};
use uuid::Uuid;

use crate::domain::{RoundPusher, RoundRepository};

use super::error::StartRoundError;

pub struct StartRoundUseCase {
    repository: Arc<dyn RoundRepository>,
    pusher: Arc<dyn RoundPusher>,
    clock: Arc<dyn Clock>,
}

impl StartRoundUseCase {
    pub fn new(
        repository: Arc<dyn RoundRepository>,
        pusher: Arc<dyn RoundPusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            pusher,
            clock,
        }
    }

    /// Start a round now.
    ///
    /// # Returns
    ///
    /// * `Ok(RoundRecord)` - the stored and published round
    /// * `Err(StartRoundError)` - validation, storage or publication failed
    pub async fn execute(
        &self,
        namespace: &str,
        game_type: GameType,
        placement_duration_secs: i64,
        total_duration_secs: i64,
    ) -> Result<RoundRecord, StartRoundError> {
        let round = RoundRecord {
            id: RoundId::new(Uuid::new_v4().to_string()),
            game_type,
            started_at: self.clock.now_millis(),
            placement_duration_secs,
            total_duration_secs,
        };
        round.validate()?;

        self.repository.save(namespace, round.clone()).await?;

        let event = RoundEvent::RoundStarted {
            round: round.clone(),
        };
        let reached = self.pusher.publish(namespace, &event).await?;
        tracing::info!(
            "Round {} started on '{}' ({} subscriber(s))",
            round.id,
            namespace,
            reached
        );

        Ok(round)
    }
}
