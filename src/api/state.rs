use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::services::{LeagueService, RosterService};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Roster snapshot and refresh state
    pub roster: Arc<RosterService>,

    /// Derived views, cards, standings
    pub league: Arc<LeagueService>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(roster: Arc<RosterService>, league: Arc<LeagueService>) -> Self {
        Self {
            roster,
            league,
            start_time: Utc::now(),
        }
    }

    /// Get system uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.start_time).num_seconds().max(0) as u64
    }
}
