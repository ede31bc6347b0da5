//! Typed per-season stat lines for skaters and goalies

use serde::Serialize;
use std::ops::AddAssign;

use super::metric::Metric;
use super::player::{PlayerCategory, GOALIE_POSITION};
use super::row::{count_field, id_field, metric_field, text_field, Row};

/// Column names shared by the skater and goalie stat tables
pub mod stat_columns {
    pub const PLAYER_ID: &str = "player_id";
    pub const SEASON_ID: &str = "season_id";
    pub const GAMES_PLAYED: &str = "games_played";
    pub const GOALS: &str = "goals";
    pub const ASSISTS: &str = "assists";
    pub const POINTS: &str = "points";
    pub const POSITION: &str = "position_code";
    pub const TEAM: &str = "team_abbrevs";
}

/// Counting stats carried by every scope
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountingStats {
    pub games_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
}

impl CountingStats {
    fn from_row(row: &Row) -> Self {
        Self {
            games_played: count_field(row, stat_columns::GAMES_PLAYED),
            goals: count_field(row, stat_columns::GOALS),
            assists: count_field(row, stat_columns::ASSISTS),
            points: count_field(row, stat_columns::POINTS),
        }
    }
}

impl AddAssign for CountingStats {
    fn add_assign(&mut self, rhs: Self) {
        self.games_played = self.games_played.saturating_add(rhs.games_played);
        self.goals = self.goals.saturating_add(rhs.goals);
        self.assists = self.assists.saturating_add(rhs.assists);
        self.points = self.points.saturating_add(rhs.points);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkaterSeasonRecord {
    pub player_id: u64,
    pub season_id: u32,
    pub position_code: Option<String>,
    pub team_abbrev: Option<String>,
    #[serde(flatten)]
    pub counts: CountingStats,
    /// Goals and assists as ranked metrics; `None` when the column was absent
    #[serde(skip)]
    pub goals_metric: Option<f64>,
    #[serde(skip)]
    pub assists_metric: Option<f64>,
    pub shooting_pct: Option<f64>,
    pub toi_per_game: Option<f64>,
    pub pp_points: Option<f64>,
    pub plus_minus: Option<f64>,
}

impl SkaterSeasonRecord {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            player_id: id_field(row, stat_columns::PLAYER_ID)?,
            season_id: season_id(row),
            position_code: text_field(row, stat_columns::POSITION),
            team_abbrev: text_field(row, stat_columns::TEAM),
            counts: CountingStats::from_row(row),
            goals_metric: metric_field(row, stat_columns::GOALS),
            assists_metric: metric_field(row, stat_columns::ASSISTS),
            shooting_pct: metric_field(row, Metric::ShootingPct.column()),
            toi_per_game: metric_field(row, Metric::ToiPerGame.column()),
            pp_points: metric_field(row, Metric::PpPoints.column()),
            plus_minus: metric_field(row, Metric::PlusMinus.column()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalieSeasonRecord {
    pub player_id: u64,
    pub season_id: u32,
    pub team_abbrev: Option<String>,
    #[serde(flatten)]
    pub counts: CountingStats,
    pub wins: Option<f64>,
    pub save_pct: Option<f64>,
    pub goals_against_average: Option<f64>,
    pub shutouts: Option<f64>,
    pub games_started: Option<f64>,
    pub shots_against: Option<f64>,
}

impl GoalieSeasonRecord {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            player_id: id_field(row, stat_columns::PLAYER_ID)?,
            season_id: season_id(row),
            team_abbrev: text_field(row, stat_columns::TEAM),
            counts: CountingStats::from_row(row),
            wins: metric_field(row, Metric::Wins.column()),
            save_pct: metric_field(row, Metric::SavePct.column()),
            goals_against_average: metric_field(row, Metric::GoalsAgainstAverage.column()),
            shutouts: metric_field(row, Metric::Shutouts.column()),
            games_started: metric_field(row, Metric::GamesStarted.column()),
            shots_against: metric_field(row, Metric::ShotsAgainst.column()),
        })
    }
}

fn season_id(row: &Row) -> u32 {
    id_field(row, stat_columns::SEASON_ID)
        .and_then(|id| u32::try_from(id).ok())
        .unwrap_or(0)
}

/// One season stat line from either stat table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeasonRecord {
    Skater(SkaterSeasonRecord),
    Goalie(GoalieSeasonRecord),
}

impl SeasonRecord {
    pub fn player_id(&self) -> u64 {
        match self {
            SeasonRecord::Skater(r) => r.player_id,
            SeasonRecord::Goalie(r) => r.player_id,
        }
    }

    pub fn season_id(&self) -> u32 {
        match self {
            SeasonRecord::Skater(r) => r.season_id,
            SeasonRecord::Goalie(r) => r.season_id,
        }
    }

    pub fn category(&self) -> PlayerCategory {
        match self {
            SeasonRecord::Skater(_) => PlayerCategory::Skater,
            SeasonRecord::Goalie(_) => PlayerCategory::Goalie,
        }
    }

    pub fn counts(&self) -> CountingStats {
        match self {
            SeasonRecord::Skater(r) => r.counts,
            SeasonRecord::Goalie(r) => r.counts,
        }
    }

    pub fn team_abbrev(&self) -> Option<&str> {
        match self {
            SeasonRecord::Skater(r) => r.team_abbrev.as_deref(),
            SeasonRecord::Goalie(r) => r.team_abbrev.as_deref(),
        }
    }

    /// Position reported by the stat line. Goalie lines are always "G".
    pub fn position_code(&self) -> Option<&str> {
        match self {
            SeasonRecord::Skater(r) => r.position_code.as_deref(),
            SeasonRecord::Goalie(_) => Some(GOALIE_POSITION),
        }
    }

    /// Raw value for a ranked metric; `None` when the source column was absent
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match (self, metric) {
            (SeasonRecord::Skater(r), Metric::Goals) => r.goals_metric,
            (SeasonRecord::Skater(r), Metric::Assists) => r.assists_metric,
            (SeasonRecord::Skater(r), Metric::ShootingPct) => r.shooting_pct,
            (SeasonRecord::Skater(r), Metric::ToiPerGame) => r.toi_per_game,
            (SeasonRecord::Skater(r), Metric::PpPoints) => r.pp_points,
            (SeasonRecord::Skater(r), Metric::PlusMinus) => r.plus_minus,
            (SeasonRecord::Goalie(r), Metric::Wins) => r.wins,
            (SeasonRecord::Goalie(r), Metric::SavePct) => r.save_pct,
            (SeasonRecord::Goalie(r), Metric::GoalsAgainstAverage) => r.goals_against_average,
            (SeasonRecord::Goalie(r), Metric::Shutouts) => r.shutouts,
            (SeasonRecord::Goalie(r), Metric::GamesStarted) => r.games_started,
            (SeasonRecord::Goalie(r), Metric::ShotsAgainst) => r.shots_against,
            _ => None,
        }
    }

    /// Tie-break used by every "latest season" decision.
    ///
    /// `self` replaces `current` when its season id is numerically greater or
    /// equal, so among equal season ids the row processed last wins.
    pub fn supersedes(&self, current: &SeasonRecord) -> bool {
        self.season_id() >= current.season_id()
    }
}
