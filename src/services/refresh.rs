//! Recurring roster refresh.
//!
//! Each cycle moves `Idle -> Fetching -> Idle`, pulling the full player
//! dimension and swapping it into the snapshot on success. A failed cycle
//! leaves the previous snapshot in place and is recorded in [`RefreshState`].
//! The next cycle starts one interval after the previous one ended.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use super::snapshot::PlayerSnapshotCache;
use crate::adapters::{RemoteStore, SelectQuery};
use crate::domain::{roster_columns, PlayerRecord};
use crate::error::Result;

/// Full roster read, keyed by player id so paged reads stay consistent
pub fn roster_query(table: &str) -> SelectQuery {
    SelectQuery::new(table)
        .columns(roster_columns::ALL)
        .order_asc(roster_columns::PLAYER_ID)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPhase {
    #[default]
    Idle,
    Fetching,
}

/// Process-wide refresh health record; written only by the scheduler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshState {
    pub phase: RefreshPhase,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl RefreshState {
    fn begin(&mut self, now: DateTime<Utc>) {
        self.phase = RefreshPhase::Fetching;
        self.last_attempt_at = Some(now);
    }

    fn succeed(&mut self, now: DateTime<Utc>) {
        self.phase = RefreshPhase::Idle;
        self.last_success_at = Some(now);
        self.last_error_at = None;
        self.last_error = None;
        self.consecutive_failures = 0;
    }

    fn fail(&mut self, now: DateTime<Utc>, error: String) {
        self.phase = RefreshPhase::Idle;
        self.last_error_at = Some(now);
        self.last_error = Some(error);
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }
}

/// Shared handle readers use to observe the scheduler's state
pub type SharedRefreshState = Arc<RwLock<RefreshState>>;

pub struct RefreshScheduler {
    store: Arc<dyn RemoteStore>,
    snapshot: PlayerSnapshotCache,
    state: SharedRefreshState,
    roster_table: String,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        snapshot: PlayerSnapshotCache,
        state: SharedRefreshState,
        roster_table: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            snapshot,
            state,
            roster_table: roster_table.into(),
            interval,
        }
    }

    async fn fetch_roster(&self) -> Result<Vec<PlayerRecord>> {
        let rows = self.store.select(&roster_query(&self.roster_table)).await?;
        let total = rows.len();
        let records: Vec<PlayerRecord> = rows
            .iter()
            .filter_map(PlayerRecord::from_roster_row)
            .collect();
        if records.len() < total {
            debug!(
                dropped = total - records.len(),
                "roster rows without a player id skipped"
            );
        }
        Ok(records)
    }

    /// Run one cycle. Errors are recorded in the state and returned, never panicked on.
    pub async fn refresh_once(&self) -> Result<usize> {
        let started = Instant::now();
        self.state.write().await.begin(Utc::now());

        match self.fetch_roster().await {
            Ok(records) => {
                let count = records.len();
                self.snapshot.set(records).await;
                self.state.write().await.succeed(Utc::now());
                info!(
                    players = count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "roster refreshed"
                );
                Ok(count)
            }
            Err(e) => {
                let failures = {
                    let mut state = self.state.write().await;
                    state.fail(Utc::now(), e.to_string());
                    state.consecutive_failures
                };
                warn!(
                    error = %e,
                    consecutive_failures = failures,
                    "roster refresh failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    /// Loop until `shutdown` flips to true (or its sender is dropped).
    ///
    /// Shutdown is checked after each cycle and while sleeping; an in-flight
    /// fetch always completes and is applied whole before the loop exits.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            table = %self.roster_table,
            interval_secs = self.interval.as_secs(),
            "refresh scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            // Failures are already recorded and logged
            let _ = self.refresh_once().await;

            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.wait_for(|stop| *stop) => break,
            }
        }

        info!("refresh scheduler stopped");
    }

    /// Spawn [`run`](Self::run) on the runtime
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MockRemoteStore;
    use crate::domain::Row;
    use crate::error::StatsError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn roster_row(id: u64, first: &str, last: &str) -> Row {
        json!({
            "Player ID": id,
            "first_name": first,
            "Last Name": last,
            "Games Played": 10,
            "Points": 12,
            "Position": "C",
            "Team Abbreviation": "EDM"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    type Harness = (RefreshScheduler, PlayerSnapshotCache, SharedRefreshState);

    fn scheduler(store: MockRemoteStore) -> Harness {
        let snapshot = PlayerSnapshotCache::new();
        let state: SharedRefreshState = Arc::new(RwLock::new(RefreshState::default()));
        let scheduler = RefreshScheduler::new(
            Arc::new(store),
            snapshot.clone(),
            state.clone(),
            "test_database",
            Duration::from_secs(3600),
        );
        (scheduler, snapshot, state)
    }

    /// Store answering each call with the next scripted response
    fn scripted(responses: Vec<Option<Vec<Row>>>) -> MockRemoteStore {
        let calls = AtomicUsize::new(0);
        let mut store = MockRemoteStore::new();
        store.expect_select().returning(move |query| {
            assert_eq!(query.table, "test_database");
            assert_eq!(query.order_by[0].column, "Player ID");
            let n = calls.fetch_add(1, Ordering::SeqCst);
            match responses.get(n).cloned().flatten() {
                Some(rows) => Ok(rows),
                None => Err(StatsError::UpstreamUnavailable(format!("cycle {n} down"))),
            }
        });
        store
    }

    #[tokio::test]
    async fn test_success_replaces_snapshot_exactly() {
        let store = scripted(vec![
            Some(vec![
                roster_row(1, "Connor", "McDavid"),
                roster_row(2, "Leon", "Draisaitl"),
            ]),
            Some(vec![roster_row(3, "Zach", "Hyman")]),
        ]);
        let (scheduler, snapshot, state) = scheduler(store);

        assert_eq!(scheduler.refresh_once().await.unwrap(), 2);
        assert_eq!(scheduler.refresh_once().await.unwrap(), 1);

        let ids: Vec<u64> = snapshot.get_all().await.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3]);
        let state = state.read().await.clone();
        assert_eq!(state.phase, RefreshPhase::Idle);
        assert!(state.last_success_at.is_some());
        assert_eq!(state.consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_snapshot() {
        let first = Some(vec![roster_row(1, "Connor", "McDavid")]);
        let store = scripted(vec![first, None, None]);
        let (scheduler, snapshot, state) = scheduler(store);

        scheduler.refresh_once().await.unwrap();
        let before = snapshot.get_all().await;
        assert!(scheduler.refresh_once().await.is_err());
        assert!(scheduler.refresh_once().await.is_err());

        assert_eq!(*snapshot.get_all().await, *before);
        let state = state.read().await.clone();
        assert_eq!(state.consecutive_failures, 2);
        let error = state.last_error.as_deref().unwrap_or_default();
        assert!(error.contains("cycle 2 down"));
        assert!(state.last_error_at.is_some());
        assert!(state.last_success_at.is_some());
    }

    #[tokio::test]
    async fn test_success_clears_error_fields() {
        let store = scripted(vec![None, Some(vec![roster_row(5, "Evan", "Bouchard")])]);
        let (scheduler, snapshot, state) = scheduler(store);

        assert!(scheduler.refresh_once().await.is_err());
        assert!(snapshot.is_empty().await);
        assert_eq!(state.read().await.consecutive_failures, 1);

        scheduler.refresh_once().await.unwrap();
        let state = state.read().await.clone();
        assert_eq!(state.consecutive_failures, 0);
        assert!(state.last_error.is_none());
        assert!(state.last_error_at.is_none());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_without_waiting_interval() {
        let store = scripted(vec![Some(vec![roster_row(1, "Connor", "McDavid")])]);
        let (scheduler, snapshot, _state) = scheduler(store);
        let (tx, rx) = watch::channel(false);

        let handle = scheduler.spawn(rx);
        // Wait for the immediate first cycle to land
        for _ in 0..100 {
            if !snapshot.is_empty().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not observe shutdown")
            .unwrap();
        // Shutdown does not clear the snapshot
        assert_eq!(snapshot.len().await, 1);
    }

    #[tokio::test]
    async fn test_run_exits_immediately_when_already_cancelled() {
        let mut store = MockRemoteStore::new();
        store.expect_select().never();
        let (scheduler, _snapshot, state) = scheduler(store);
        let (_tx, rx) = watch::channel(true);

        scheduler.run(rx).await;
        assert!(state.read().await.last_attempt_at.is_none());
    }
}
