//! In-memory round repository.
//!
//! Keeps a bounded history; the oldest rounds are evicted first.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use roundfeed_shared::round::{RoundId, RoundRecord};
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, RoundRepository};

pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

#[derive(Default)]
struct Store {
    rounds: HashMap<RoundId, RoundRecord>,
    /// Insertion order, for eviction
    order: VecDeque<RoundId>,
    current: HashMap<String, RoundId>,
}

pub struct InMemoryRoundRepository {
    store: Mutex<Store>,
    capacity: usize,
}

impl InMemoryRoundRepository {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            capacity: capacity.max(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.rounds.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryRoundRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoundRepository for InMemoryRoundRepository {
    async fn save(&self, namespace: &str, round: RoundRecord) -> Result<(), RepositoryError> {
        let mut store = self.store.lock().await;
        if store.rounds.contains_key(&round.id) {
            return Err(RepositoryError::DuplicateRound(round.id.into_string()));
        }

        while store.order.len() >= self.capacity {
            let Some(evicted) = store.order.pop_front() else {
                break;
            };
            store.rounds.remove(&evicted);
            store.current.retain(|_, current| *current != evicted);
        }

        store.order.push_back(round.id.clone());
        store.current.insert(namespace.to_string(), round.id.clone());
        store.rounds.insert(round.id.clone(), round);
        Ok(())
    }

    async fn get(&self, round_id: &RoundId) -> Result<Option<RoundRecord>, RepositoryError> {
        Ok(self.store.lock().await.rounds.get(round_id).cloned())
    }

    async fn current(&self, namespace: &str) -> Result<Option<RoundRecord>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .current
            .get(namespace)
            .and_then(|round_id| store.rounds.get(round_id))
            .cloned())
    }
}
