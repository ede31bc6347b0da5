use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::row::{count_field, id_field, text_field, Row};
use crate::error::StatsError;

/// Column names of the player dimension (roster) table
pub mod roster_columns {
    pub const PLAYER_ID: &str = "Player ID";
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "Last Name";
    pub const HEADSHOT: &str = "Headshot";
    pub const GAMES_PLAYED: &str = "Games Played";
    pub const GOALS: &str = "Goals";
    pub const ASSISTS: &str = "Assists";
    pub const POINTS: &str = "Points";
    pub const POSITION: &str = "Position";
    pub const TEAM: &str = "Team Abbreviation";

    pub const ALL: [&str; 10] = [
        PLAYER_ID,
        FIRST_NAME,
        LAST_NAME,
        HEADSHOT,
        GAMES_PLAYED,
        GOALS,
        ASSISTS,
        POINTS,
        POSITION,
        TEAM,
    ];
}

/// Position code reserved for goaltenders
pub const GOALIE_POSITION: &str = "G";

/// Denormalized view of one player for a given stats scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub headshot: Option<String>,
    pub position: String,
    pub team_abbr: Option<String>,
    pub games_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub points: u32,
    /// Season the stats belong to (season scope) or the latest season seen (career scope)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_id: Option<u32>,
}

impl PlayerRecord {
    /// Normalize one roster row. Rows without a usable player id are dropped.
    pub fn from_roster_row(row: &Row) -> Option<Self> {
        use roster_columns::*;

        let id = id_field(row, PLAYER_ID)?;
        Some(Self {
            id,
            first_name: text_field(row, FIRST_NAME).unwrap_or_default(),
            last_name: text_field(row, LAST_NAME).unwrap_or_default(),
            headshot: text_field(row, HEADSHOT),
            position: text_field(row, POSITION).unwrap_or_default(),
            team_abbr: text_field(row, TEAM),
            games_played: count_field(row, GAMES_PLAYED),
            goals: count_field(row, GOALS),
            assists: count_field(row, ASSISTS),
            points: count_field(row, POINTS),
            season_id: None,
        })
    }

    pub fn is_goalie(&self) -> bool {
        self.position.eq_ignore_ascii_case(GOALIE_POSITION)
    }
}

/// Which derived view a query runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsScope {
    /// Latest season per player
    #[default]
    Season,
    /// Summed across every recorded season
    Career,
}

impl StatsScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsScope::Season => "season",
            StatsScope::Career => "career",
        }
    }
}

impl fmt::Display for StatsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatsScope {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "season" => Ok(StatsScope::Season),
            "career" => Ok(StatsScope::Career),
            other => Err(StatsError::Validation(format!(
                "stats_scope must be 'season' or 'career', got '{}'",
                other
            ))),
        }
    }
}

/// Player category, fixed by which stat table a player's rows come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerCategory {
    Skater,
    Goalie,
}

impl PlayerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerCategory::Skater => "skater",
            PlayerCategory::Goalie => "goalie",
        }
    }
}

impl fmt::Display for PlayerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerCategory {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skater" | "skaters" => Ok(PlayerCategory::Skater),
            "goalie" | "goalies" => Ok(PlayerCategory::Goalie),
            other => Err(StatsError::Validation(format!(
                "category must be 'skater' or 'goalie', got '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_roster_row() {
        let row = json!({
            "Player ID": 8478402,
            "first_name": "Connor",
            "Last Name": "McDavid",
            "Headshot": "https://assets.nhle.com/mugs/8478402.png",
            "Games Played": 82,
            "Goals": "64",
            "Assists": 89,
            "Points": null,
            "Position": "C",
            "Team Abbreviation": "EDM"
        });
        let row = row.as_object().unwrap();
        let record = PlayerRecord::from_roster_row(row).unwrap();
        assert_eq!(record.id, 8478402);
        assert_eq!(record.first_name, "Connor");
        assert_eq!(record.goals, 64);
        assert_eq!(record.points, 0);
        assert_eq!(record.team_abbr.as_deref(), Some("EDM"));
        assert!(!record.is_goalie());
    }

    #[test]
    fn test_roster_row_without_id_is_dropped() {
        let row = json!({ "first_name": "Nobody" });
        let record = PlayerRecord::from_roster_row(row.as_object().unwrap());
        assert!(record.is_none());
    }

    #[test]
    fn test_unrostered_player_serializes_null_team() {
        let row = json!({ "Player ID": 5, "first_name": "Free", "Last Name": "Agent" });
        let row = row.as_object().unwrap();
        let record = PlayerRecord::from_roster_row(row).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["teamAbbr"], serde_json::Value::Null);
        assert_eq!(value["firstName"], "Free");
        assert!(value.get("seasonId").is_none());
    }

    #[test]
    fn test_scope_and_category_parsing() {
        assert_eq!("".parse::<StatsScope>().unwrap(), StatsScope::Season);
        assert_eq!("Career".parse::<StatsScope>().unwrap(), StatsScope::Career);
        assert!("lifetime".parse::<StatsScope>().is_err());
        assert_eq!(
            "goalie".parse::<PlayerCategory>().unwrap(),
            PlayerCategory::Goalie
        );
        assert!("referee".parse::<PlayerCategory>().is_err());
    }
}
