//! Lifecycle owner of the roster snapshot and its refresh scheduler

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::refresh::{RefreshScheduler, RefreshState, SharedRefreshState};
use super::snapshot::PlayerSnapshotCache;
use crate::adapters::RemoteStore;
use crate::domain::PlayerRecord;
use crate::error::{Result, StatsError};

struct RunningScheduler {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the snapshot, the refresh state and the background task.
///
/// Readers only ever take cheap read locks; the scheduler is the single writer.
pub struct RosterService {
    snapshot: PlayerSnapshotCache,
    state: SharedRefreshState,
    scheduler: Mutex<Option<RunningScheduler>>,
}

impl RosterService {
    pub fn new() -> Self {
        Self {
            snapshot: PlayerSnapshotCache::new(),
            state: Arc::new(RwLock::new(RefreshState::default())),
            scheduler: Mutex::new(None),
        }
    }

    /// Spawn the refresh loop. The first cycle runs immediately.
    pub async fn start(
        &self,
        store: Arc<dyn RemoteStore>,
        roster_table: &str,
        interval: Duration,
    ) -> Result<()> {
        let mut slot = self.scheduler.lock().await;
        if slot.is_some() {
            return Err(StatsError::Internal(
                "roster refresh already running".to_string(),
            ));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = RefreshScheduler::new(
            store,
            self.snapshot.clone(),
            Arc::clone(&self.state),
            roster_table,
            interval,
        );
        let handle = scheduler.spawn(shutdown_rx);
        *slot = Some(RunningScheduler {
            shutdown_tx,
            handle,
        });
        Ok(())
    }

    /// Signal the scheduler and wait for it to exit. Safe to call when not started.
    pub async fn shutdown(&self) {
        let running = self.scheduler.lock().await.take();
        let Some(running) = running else {
            return;
        };

        // A send error only means the task already exited
        let _ = running.shutdown_tx.send(true);
        match running.handle.await {
            Ok(()) => info!("roster refresh shut down"),
            Err(e) => warn!(error = %e, "roster refresh task ended abnormally"),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.scheduler
            .lock()
            .await
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }

    pub async fn get_all(&self) -> Arc<Vec<PlayerRecord>> {
        self.snapshot.get_all().await
    }

    pub async fn get(&self, player_id: u64) -> Option<PlayerRecord> {
        self.snapshot.get(player_id).await
    }

    pub async fn len(&self) -> usize {
        self.snapshot.len().await
    }

    pub async fn refresh_state(&self) -> RefreshState {
        self.state.read().await.clone()
    }

    pub fn snapshot(&self) -> &PlayerSnapshotCache {
        &self.snapshot
    }
}

impl Default for RosterService {
    fn default() -> Self {
        Self::new()
    }
}
