use serde::{Deserialize, Serialize};
use std::fmt;

use super::player::PlayerCategory;

/// Per-season metrics ranked on the player card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    // Skater
    Goals,
    Assists,
    ShootingPct,
    ToiPerGame,
    PpPoints,
    PlusMinus,
    // Goalie
    Wins,
    SavePct,
    GoalsAgainstAverage,
    Shutouts,
    GamesStarted,
    ShotsAgainst,
}

pub const SKATER_METRICS: [Metric; 6] = [
    Metric::Goals,
    Metric::Assists,
    Metric::ShootingPct,
    Metric::ToiPerGame,
    Metric::PpPoints,
    Metric::PlusMinus,
];

pub const GOALIE_METRICS: [Metric; 6] = [
    Metric::Wins,
    Metric::SavePct,
    Metric::GoalsAgainstAverage,
    Metric::Shutouts,
    Metric::GamesStarted,
    Metric::ShotsAgainst,
];

impl Metric {
    /// Column name in the stat tables
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Goals => "goals",
            Metric::Assists => "assists",
            Metric::ShootingPct => "shooting_pct",
            Metric::ToiPerGame => "toi_per_game",
            Metric::PpPoints => "pp_points",
            Metric::PlusMinus => "plus_minus",
            Metric::Wins => "wins",
            Metric::SavePct => "save_pct",
            Metric::GoalsAgainstAverage => "goals_against_average",
            Metric::Shutouts => "shutouts",
            Metric::GamesStarted => "games_started",
            Metric::ShotsAgainst => "shots_against",
        }
    }

    /// Short label drawn next to the percentile bar
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Goals => "Goals",
            Metric::Assists => "Assists",
            Metric::ShootingPct => "SH%",
            Metric::ToiPerGame => "TOI",
            Metric::PpPoints => "PPP",
            Metric::PlusMinus => "+/-",
            Metric::Wins => "Wins",
            Metric::SavePct => "SV%",
            Metric::GoalsAgainstAverage => "GAA",
            Metric::Shutouts => "SO",
            Metric::GamesStarted => "GS",
            Metric::ShotsAgainst => "SA",
        }
    }

    /// True when a smaller raw value ranks higher
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Metric::GoalsAgainstAverage)
    }

    /// Ordered metric set for a category
    pub fn for_category(category: PlayerCategory) -> &'static [Metric] {
        match category {
            PlayerCategory::Skater => &SKATER_METRICS,
            PlayerCategory::Goalie => &GOALIE_METRICS,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}
