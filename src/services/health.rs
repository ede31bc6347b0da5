//! Service health derived from the roster refresh state
//!
//! Consumed by the `/health` probe. `/healthz` is a plain liveness check and
//! does not look at any of this.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::refresh::RefreshState;
use super::roster::RosterService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Status for a refresh record.
    ///
    /// * healthy: at least one success and the latest cycle succeeded
    /// * unhealthy: every attempt so far has failed
    /// * degraded: serving a stale snapshot, or still waiting on the first cycle
    pub fn from_refresh(state: &RefreshState) -> Self {
        match (state.last_success_at, state.consecutive_failures) {
            (Some(_), 0) => HealthStatus::Healthy,
            (None, n) if n > 0 => HealthStatus::Unhealthy,
            _ => HealthStatus::Degraded,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// True unless unhealthy; for clients that only read `ok`
    pub ok: bool,
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub players_cached: usize,
    /// Whether the refresh loop is alive
    pub refresh_running: bool,
    pub refresh: RefreshState,
}

impl HealthReport {
    pub async fn collect(roster: &RosterService, uptime_seconds: u64) -> Self {
        let refresh = roster.refresh_state().await;
        let players_cached = roster.len().await;
        let refresh_running = roster.is_running().await;
        let status = HealthStatus::from_refresh(&refresh);

        Self {
            ok: status != HealthStatus::Unhealthy,
            status,
            timestamp: Utc::now(),
            uptime_seconds,
            players_cached,
            refresh_running,
            refresh,
        }
    }
}
