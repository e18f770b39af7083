//! `tokio::sync::broadcast` implementation of `RoundPusher`.
//!
//! One channel per namespace, created on first publish or subscribe. Each
//! WebSocket connection holds a receiver and forwards frames to its socket.

use std::collections::HashMap;

use async_trait::async_trait;
use roundfeed_shared::wire::RoundEvent;
use tokio::sync::{Mutex, broadcast};

use crate::domain::{PushChannel, PushError, RoundPusher};

pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

pub struct BroadcastRoundPusher {
    channels: Mutex<HashMap<String, broadcast::Sender<String>>>,
    capacity: usize,
}

impl BroadcastRoundPusher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    async fn sender(&self, namespace: &str) -> broadcast::Sender<String> {
        let mut channels = self.channels.lock().await;
        channels
            .entry(namespace.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for BroadcastRoundPusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoundPusher for BroadcastRoundPusher {
    async fn publish(&self, namespace: &str, event: &RoundEvent) -> Result<usize, PushError> {
        let json = event
            .to_json()
            .map_err(|e| PushError::Encode(e.to_string()))?;
        // send fails only when nobody is subscribed
        let reached = self.sender(namespace).await.send(json).unwrap_or(0);
        tracing::debug!("Published to {} subscriber(s) of '{}'", reached, namespace);
        Ok(reached)
    }

    async fn subscribe(&self, namespace: &str) -> PushChannel {
        self.sender(namespace).await.subscribe()
    }
}
