//! Primary snapshot of the normalized roster.
//!
//! The roster is held behind an `Arc` that is swapped wholesale on every
//! successful refresh, so a reader either sees the previous roster or the new
//! one, never a mix. The write lock is held only for the pointer swap.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::PlayerRecord;

#[derive(Clone, Default)]
pub struct PlayerSnapshotCache {
    current: Arc<RwLock<Arc<Vec<PlayerRecord>>>>,
}

impl PlayerSnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole roster
    pub async fn set(&self, records: Vec<PlayerRecord>) {
        let next = Arc::new(records);
        *self.current.write().await = next;
    }

    /// Current roster; empty before the first successful refresh
    pub async fn get_all(&self) -> Arc<Vec<PlayerRecord>> {
        Arc::clone(&*self.current.read().await)
    }

    pub async fn get(&self, player_id: u64) -> Option<PlayerRecord> {
        self.current
            .read()
            .await
            .iter()
            .find(|p| p.id == player_id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.current.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
