//! Round event publication trait.

use async_trait::async_trait;
use roundfeed_shared::wire::RoundEvent;
use tokio::sync::broadcast;

use super::PushError;

/// Receiving end handed to one WebSocket subscriber (JSON text frames).
pub type PushChannel = broadcast::Receiver<String>;

#[async_trait]
pub trait RoundPusher: Send + Sync {
    /// Publish `event` to every subscriber of `namespace`.
    ///
    /// Returns the number of subscribers reached; zero is not an error.
    async fn publish(&self, namespace: &str, event: &RoundEvent) -> Result<usize, PushError>;

    /// Subscribe to events published on `namespace` from now on
    async fn subscribe(&self, namespace: &str) -> PushChannel;
}
