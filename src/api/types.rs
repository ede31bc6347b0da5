use serde::{Deserialize, Serialize};

use crate::analytics::{PlayerQuery, SortOrder};
use crate::domain::{PlayerCategory, PlayerRecord, Row, StatsScope};
use crate::error::{Result, StatsError};

// ============================================================================
// Player listing
// ============================================================================

/// Raw `/players` query string; validated by [`PlayersParams::into_query`]
#[derive(Debug, Default, Deserialize)]
pub struct PlayersParams {
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub position: Option<String>,
    pub team: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub stats_scope: Option<String>,
}

impl PlayersParams {
    /// Apply defaults and reject out-of-range values
    pub fn into_query(self) -> Result<(StatsScope, PlayerQuery)> {
        let defaults = PlayerQuery::default();

        let page = positive("page", self.page, defaults.page)?;
        let limit = positive("limit", self.limit, defaults.limit)?;
        let sort_order: SortOrder = self.sort_order.as_deref().unwrap_or("").parse()?;
        let scope: StatsScope = self.stats_scope.as_deref().unwrap_or("").parse()?;

        let sort_by = self
            .sort_by
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.sort_by);

        Ok((
            scope,
            PlayerQuery {
                q: self.q.unwrap_or_default(),
                position: self.position.unwrap_or_default(),
                team: self.team.unwrap_or_default(),
                sort_by,
                sort_order,
                page,
                limit,
            },
        ))
    }
}

fn positive(name: &str, value: Option<i64>, default: usize) -> Result<usize> {
    match value {
        None => Ok(default),
        Some(v) if v >= 1 => usize::try_from(v)
            .map_err(|_| StatsError::Validation(format!("{} is too large", name))),
        Some(v) => Err(StatsError::Validation(format!(
            "{} must be >= 1, got {}",
            name, v
        ))),
    }
}

// ============================================================================
// Single player
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct PlayerResponse {
    pub player: PlayerRecord,
}

// ============================================================================
// League
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PercentileParams {
    pub category: Option<String>,
}

impl PercentileParams {
    /// Defaults to skaters when no category is given
    pub fn category(&self) -> Result<PlayerCategory> {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => Ok(PlayerCategory::Skater),
            Some(raw) => raw.parse(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamsResponse {
    pub teams: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StandingsResponse {
    pub standings: Vec<Row>,
}
