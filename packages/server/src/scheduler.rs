//! Back-to-back round scheduling, one task per table.

use std::{sync::Arc, time::Duration};

use roundfeed_shared::round::{GameType, RoundId, RoundRecord, RoundRecordError};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::usecase::{EndRoundUseCase, StartRoundError, StartRoundUseCase};

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// A table runs rounds of one game type on one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableConfig {
    pub namespace: String,
    pub game_type: GameType,
    pub placement_duration_secs: i64,
    pub total_duration_secs: i64,
}

impl TableConfig {
    /// Table named after its game type
    pub fn for_game(game_type: GameType, placement_secs: i64, total_secs: i64) -> Self {
        Self {
            namespace: game_type.as_str().to_string(),
            game_type,
            placement_duration_secs: placement_secs,
            total_duration_secs: total_secs,
        }
    }

    /// Check the durations with the same rules a round record uses
    pub fn validate(&self) -> Result<(), RoundRecordError> {
        RoundRecord {
            id: RoundId::new(""),
            game_type: self.game_type,
            started_at: 0,
            placement_duration_secs: self.placement_duration_secs,
            total_duration_secs: self.total_duration_secs,
        }
        .validate()
    }
}

pub struct RoundScheduler {
    start_round: Arc<StartRoundUseCase>,
    end_round: Arc<EndRoundUseCase>,
}

impl RoundScheduler {
    pub fn new(start_round: Arc<StartRoundUseCase>, end_round: Arc<EndRoundUseCase>) -> Self {
        Self {
            start_round,
            end_round,
        }
    }

    /// Spawn one round loop per table. Aborting a handle stops that table.
    pub fn spawn(self: &Arc<Self>, tables: &[TableConfig]) -> Vec<JoinHandle<()>> {
        tables
            .iter()
            .cloned()
            .map(|table| {
                let scheduler = self.clone();
                tokio::spawn(async move { scheduler.run_table(table).await })
            })
            .collect()
    }

    async fn run_table(&self, table: TableConfig) {
        tracing::info!(
            "Table '{}' running {} rounds ({}s placement / {}s total)",
            table.namespace,
            table.game_type,
            table.placement_duration_secs,
            table.total_duration_secs
        );

        loop {
            let round = match self
                .start_round
                .execute(
                    &table.namespace,
                    table.game_type,
                    table.placement_duration_secs,
                    table.total_duration_secs,
                )
                .await
            {
                Ok(round) => round,
                Err(StartRoundError::InvalidRound(e)) => {
                    tracing::error!("Table '{}' stopped: {}", table.namespace, e);
                    return;
                }
                Err(e) => {
                    tracing::warn!("Table '{}' failed to start a round: {}", table.namespace, e);
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            let total = u64::try_from(round.total_duration_secs).unwrap_or(0);
            tokio::time::sleep(Duration::from_secs(total)).await;

            if let Err(e) = self.end_round.execute(&table.namespace, round.id).await {
                tracing::warn!("Table '{}' failed to end round: {}", table.namespace, e);
            }
        }
    }
}
