//! UseCase: announce the end of a round.

use std::sync::Arc;

use roundfeed_shared::{round::RoundId, wire::RoundEvent};

use crate::domain::{PushError, RoundPusher};

pub struct EndRoundUseCase {
    pusher: Arc<dyn RoundPusher>,
}

impl EndRoundUseCase {
    pub fn new(pusher: Arc<dyn RoundPusher>) -> Self {
        Self { pusher }
    }

    pub async fn execute(&self, namespace: &str, round_id: RoundId) -> Result<(), PushError> {
        let event = RoundEvent::RoundEnded { round_id };
        self.pusher.publish(namespace, &event).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::round_pusher::BroadcastRoundPusher;

    #[tokio::test]
    async fn test_end_round_publishes_round_ended() {
        // テスト項目: round-ended イベントが購読者に届く
        // given (前提条件):
        let pusher = Arc::new(BroadcastRoundPusher::new());
        let mut subscriber = pusher.subscribe("jackpot").await;
        let usecase = EndRoundUseCase::new(pusher);

        // when (操作):
        usecase
            .execute("jackpot", RoundId::new("r-7"))
            .await
            .unwrap();

        // then (期待する結果):
        let frame = subscriber.recv().await.unwrap();
        assert_eq!(
            RoundEvent::from_json(&frame).unwrap(),
            RoundEvent::RoundEnded {
                round_id: RoundId::new("r-7")
            }
        );
    }
}
