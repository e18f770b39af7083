//! HTTP response bodies.

use roundfeed_shared::{
    round::{GameType, RoundRecord},
    time::timestamp_to_rfc3339,
};
use serde::{Deserialize, Serialize};

use crate::scheduler::TableConfig;

/// `GET /api/rounds/{round_id}` and `GET /api/tables/{namespace}/current`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundDetailDto {
    pub id: String,
    pub game_type: GameType,
    /// Unix timestamp (milliseconds), as the client computes with it
    pub started_at: i64,
    /// `started_at` in RFC 3339 for humans
    pub started_at_rfc3339: String,
    pub placement_duration_secs: i64,
    pub total_duration_secs: i64,
}

impl From<RoundRecord> for RoundDetailDto {
    fn from(round: RoundRecord) -> Self {
        Self {
            started_at_rfc3339: timestamp_to_rfc3339(round.started_at),
            id: round.id.into_string(),
            game_type: round.game_type,
            started_at: round.started_at,
            placement_duration_secs: round.placement_duration_secs,
            total_duration_secs: round.total_duration_secs,
        }
    }
}

/// `GET /api/tables`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummaryDto {
    pub namespace: String,
    pub game_type: GameType,
    pub placement_duration_secs: i64,
    pub total_duration_secs: i64,
}

impl From<&TableConfig> for TableSummaryDto {
    fn from(table: &TableConfig) -> Self {
        Self {
            namespace: table.namespace.clone(),
            game_type: table.game_type,
            placement_duration_secs: table.placement_duration_secs,
            total_duration_secs: table.total_duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundfeed_shared::round::RoundId;

    #[test]
    fn test_round_detail_from_record() {
        // テスト項目: RoundRecord から DTO へ変換すると開始時刻が RFC3339 でも入る
        // given (前提条件):
        let round = RoundRecord {
            id: RoundId::new("round-1"),
            game_type: GameType::Aviator,
            started_at: 0,
            placement_duration_secs: 5,
            total_duration_secs: 25,
        };

        // when (操作):
        let dto = RoundDetailDto::from(round);

        // then (期待する結果):
        assert_eq!(dto.id, "round-1");
        assert_eq!(dto.started_at, 0);
        assert_eq!(dto.started_at_rfc3339, "1970-01-01T00:00:00.000Z");
        assert_eq!(dto.total_duration_secs, 25);
    }
}
