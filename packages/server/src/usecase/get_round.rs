//! UseCase: look up round records.

use std::sync::Arc;

use roundfeed_shared::round::{RoundId, RoundRecord};

use crate::domain::RoundRepository;

use super::error::GetRoundError;

pub struct GetRoundUseCase {
    repository: Arc<dyn RoundRepository>,
}

impl GetRoundUseCase {
    pub fn new(repository: Arc<dyn RoundRepository>) -> Self {
        Self { repository }
    }

    /// Round by id
    pub async fn execute(&self, round_id: &RoundId) -> Result<RoundRecord, GetRoundError> {
        self.repository
            .get(round_id)
            .await?
            .ok_or(GetRoundError::RoundNotFound)
    }

    /// Latest round of a table
    pub async fn current(&self, namespace: &str) -> Result<RoundRecord, GetRoundError> {
        self.repository
            .current(namespace)
            .await?
            .ok_or(GetRoundError::RoundNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockRoundRepository, RepositoryError};
    use roundfeed_shared::round::GameType;

    fn round(id: &str) -> RoundRecord {
        RoundRecord {
            id: RoundId::new(id),
            game_type: GameType::Jackpot,
            started_at: 0,
            placement_duration_secs: 10,
            total_duration_secs: 20,
        }
    }

    #[tokio::test]
    async fn test_get_existing_round() {
        // テスト項目: 保存済みのラウンドが取得できる
        // given (前提条件):
        let mut repository = MockRoundRepository::new();
        repository
            .expect_get()
            .returning(|round_id| Ok(Some(round(round_id.as_str()))));
        let usecase = GetRoundUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.execute(&RoundId::new("r-1")).await;

        // then (期待する結果):
        assert_eq!(result, Ok(round("r-1")));
    }

    #[tokio::test]
    async fn test_missing_round_is_not_found() {
        // テスト項目: 存在しないラウンドは RoundNotFound になる
        // given (前提条件):
        let mut repository = MockRoundRepository::new();
        repository.expect_get().returning(|_| Ok(None));
        repository.expect_current().returning(|_| Ok(None));
        let usecase = GetRoundUseCase::new(Arc::new(repository));

        // when (操作):
        let by_id = usecase.execute(&RoundId::new("nope")).await;
        let current = usecase.current("slot").await;

        // then (期待する結果):
        assert_eq!(by_id, Err(GetRoundError::RoundNotFound));
        assert_eq!(current, Err(GetRoundError::RoundNotFound));
    }

    #[tokio::test]
    async fn test_repository_error_is_propagated() {
        // テスト項目: Repository のエラーがそのまま伝播する
        // given (前提条件):
        let mut repository = MockRoundRepository::new();
        repository
            .expect_current()
            .returning(|_| Err(RepositoryError::Unavailable("locked".to_string())));
        let usecase = GetRoundUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.current("dice").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(GetRoundError::Repository(RepositoryError::Unavailable(
                "locked".to_string()
            )))
        );
    }
}
