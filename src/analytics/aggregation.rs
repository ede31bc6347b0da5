//! Season-scope and career-scope player views.
//!
//! Both views join the player dimension with the skater and goalie stat
//! tables, falling back to the cached roster for display fields. Rows are
//! folded skater table first, then goalie table, each in the order received;
//! "latest season" decisions go through [`SeasonRecord::supersedes`], so on an
//! exact season-id tie the row folded last wins.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::{
    CountingStats, GoalieSeasonRecord, PlayerRecord, SeasonRecord, SkaterSeasonRecord,
    GOALIE_POSITION,
};

/// Sources merged into a derived view
#[derive(Debug, Clone, Copy)]
pub struct AggregationInput<'a> {
    /// Player dimension rows (identity and display fields)
    pub dimension: &'a [PlayerRecord],
    pub skaters: &'a [SkaterSeasonRecord],
    pub goalies: &'a [GoalieSeasonRecord],
    /// Current snapshot, consulted when the other sources lack a field
    pub cached: &'a [PlayerRecord],
}

impl<'a> AggregationInput<'a> {
    fn season_rows(&self) -> impl Iterator<Item = SeasonRecord> + 'a {
        self.skaters
            .iter()
            .cloned()
            .map(SeasonRecord::Skater)
            .chain(self.goalies.iter().cloned().map(SeasonRecord::Goalie))
    }
}

/// Latest season row per player, using the `>=` tie-break
pub fn latest_seasons<I>(rows: I) -> BTreeMap<u64, SeasonRecord>
where
    I: IntoIterator<Item = SeasonRecord>,
{
    let mut latest: BTreeMap<u64, SeasonRecord> = BTreeMap::new();
    for row in rows {
        let replace = latest
            .get(&row.player_id())
            .map_or(true, |current| row.supersedes(current));
        if replace {
            latest.insert(row.player_id(), row);
        }
    }
    latest
}

/// One record per player with a stat row, stats from that player's latest season.
/// Output is ordered by player id.
pub fn season_view(input: &AggregationInput<'_>) -> Vec<PlayerRecord> {
    let resolver = FieldResolver::new(input);
    latest_seasons(input.season_rows())
        .into_values()
        .map(|row| {
            let counts = row.counts();
            resolver.project(&row, counts)
        })
        .collect()
}

struct CareerTotals {
    latest: SeasonRecord,
    totals: CountingStats,
}

/// One record per player with a stat row, stats summed across every season.
/// Team and position come from the latest season folded. Output is ordered by player id.
pub fn career_view(input: &AggregationInput<'_>) -> Vec<PlayerRecord> {
    let resolver = FieldResolver::new(input);
    let mut careers: BTreeMap<u64, CareerTotals> = BTreeMap::new();

    for row in input.season_rows() {
        match careers.entry(row.player_id()) {
            Entry::Occupied(mut entry) => {
                let career = entry.get_mut();
                career.totals += row.counts();
                if row.supersedes(&career.latest) {
                    career.latest = row;
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(CareerTotals {
                    totals: row.counts(),
                    latest: row,
                });
            }
        }
    }

    careers
        .into_values()
        .map(|career| resolver.project(&career.latest, career.totals))
        .collect()
}

/// Field precedence shared by both views
struct FieldResolver<'a> {
    dimension: HashMap<u64, &'a PlayerRecord>,
    cached: HashMap<u64, &'a PlayerRecord>,
    goalies: HashSet<u64>,
}

impl<'a> FieldResolver<'a> {
    fn new(input: &AggregationInput<'a>) -> Self {
        Self {
            dimension: input.dimension.iter().map(|p| (p.id, p)).collect(),
            cached: input.cached.iter().map(|p| (p.id, p)).collect(),
            goalies: input.goalies.iter().map(|g| g.player_id).collect(),
        }
    }

    fn project(&self, row: &SeasonRecord, counts: CountingStats) -> PlayerRecord {
        let id = row.player_id();
        let dim = self.dimension.get(&id).copied();
        let cached = self.cached.get(&id).copied();

        let display = |field: fn(&PlayerRecord) -> &str| -> String {
            [dim, cached]
                .into_iter()
                .flatten()
                .map(field)
                .find(|v| !v.is_empty())
                .unwrap_or_default()
                .to_string()
        };

        // Goalie table membership overrides every other position source
        let position = if self.goalies.contains(&id) {
            GOALIE_POSITION.to_string()
        } else {
            row.position_code()
                .map(str::to_string)
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| display(|p| p.position.as_str()))
        };

        let team_abbr = row
            .team_abbrev()
            .map(str::to_string)
            .or_else(|| cached.and_then(|c| c.team_abbr.clone()));

        let headshot = dim
            .and_then(|d| d.headshot.clone())
            .or_else(|| cached.and_then(|c| c.headshot.clone()));

        PlayerRecord {
            id,
            first_name: display(|p| p.first_name.as_str()),
            last_name: display(|p| p.last_name.as_str()),
            headshot,
            position,
            team_abbr,
            games_played: counts.games_played,
            goals: counts.goals,
            assists: counts.assists,
            points: counts.points,
            season_id: Some(row.season_id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skater(id: u64, season: u32, team: &str, gp: u32, g: u32, a: u32) -> SkaterSeasonRecord {
        SkaterSeasonRecord {
            player_id: id,
            season_id: season,
            position_code: Some("C".into()),
            team_abbrev: Some(team.into()),
            counts: CountingStats {
                games_played: gp,
                goals: g,
                assists: a,
                points: g + a,
            },
            goals_metric: Some(g as f64),
            assists_metric: Some(a as f64),
            shooting_pct: None,
            toi_per_game: None,
            pp_points: None,
            plus_minus: None,
        }
    }

    fn goalie(id: u64, season: u32, team: &str, gp: u32) -> GoalieSeasonRecord {
        GoalieSeasonRecord {
            player_id: id,
            season_id: season,
            team_abbrev: Some(team.into()),
            counts: CountingStats {
                games_played: gp,
                ..Default::default()
            },
            wins: None,
            save_pct: None,
            goals_against_average: None,
            shutouts: None,
            games_started: None,
            shots_against: None,
        }
    }

    fn person(id: u64, first: &str, last: &str, position: &str) -> PlayerRecord {
        PlayerRecord {
            id,
            first_name: first.into(),
            last_name: last.into(),
            headshot: None,
            position: position.into(),
            team_abbr: None,
            games_played: 0,
            goals: 0,
            assists: 0,
            points: 0,
            season_id: None,
        }
    }

    fn input<'a>(
        dimension: &'a [PlayerRecord],
        skaters: &'a [SkaterSeasonRecord],
        goalies: &'a [GoalieSeasonRecord],
        cached: &'a [PlayerRecord],
    ) -> AggregationInput<'a> {
        AggregationInput {
            dimension,
            skaters,
            goalies,
            cached,
        }
    }

    #[test]
    fn test_season_view_picks_latest_season() {
        let skaters = vec![
            skater(97, 20242025, "EDM", 80, 30, 70),
            skater(97, 20252026, "EDM", 20, 10, 15),
            skater(97, 20232024, "EDM", 76, 32, 100),
        ];
        let view = season_view(&input(&[], &skaters, &[], &[]));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].season_id, Some(20252026));
        assert_eq!(view[0].games_played, 20);
        assert_eq!(view[0].points, 25);
    }

    #[test]
    fn test_season_view_tie_goes_to_last_processed() {
        let skaters = vec![
            skater(8, 20252026, "TOR", 10, 1, 1),
            skater(8, 20252026, "FLA", 12, 2, 2),
        ];
        let view = season_view(&input(&[], &skaters, &[], &[]));
        assert_eq!(view[0].team_abbr.as_deref(), Some("FLA"));
        assert_eq!(view[0].games_played, 12);
    }

    #[test]
    fn test_career_view_is_additive() {
        let skaters = vec![
            skater(1, 20232024, "EDM", 10, 5, 5),
            skater(1, 20242025, "EDM", 20, 10, 10),
        ];
        let view = career_view(&input(&[], &skaters, &[], &[]));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].games_played, 30);
        assert_eq!(view[0].goals, 15);
        assert_eq!(view[0].assists, 15);
        assert_eq!(view[0].points, 30);
    }

    #[test]
    fn test_career_team_independent_of_row_order() {
        let ordered = vec![
            skater(3, 20222023, "ARI", 82, 20, 20),
            skater(3, 20232024, "UTA", 82, 20, 20),
            skater(3, 20242025, "SEA", 82, 20, 20),
        ];
        let mut shuffled = ordered.clone();
        shuffled.swap(0, 2);
        shuffled.swap(1, 2);

        let a = career_view(&input(&[], &ordered, &[], &[]));
        let b = career_view(&input(&[], &shuffled, &[], &[]));
        assert_eq!(a[0].team_abbr.as_deref(), Some("SEA"));
        assert_eq!(b[0].team_abbr.as_deref(), Some("SEA"));
        assert_eq!(a[0].games_played, 246);
        assert_eq!(a, b);
    }

    #[test]
    fn test_goalie_position_overrides_dimension() {
        let dimension = vec![person(31, "Stuart", "Skinner", "C")];
        let goalies = vec![goalie(31, 20252026, "EDM", 40)];
        let season = season_view(&input(&dimension, &[], &goalies, &[]));
        let career = career_view(&input(&dimension, &[], &goalies, &[]));
        assert_eq!(season[0].position, "G");
        assert_eq!(career[0].position, "G");
        assert_eq!(season[0].first_name, "Stuart");
    }

    #[test]
    fn test_display_fields_fall_back_to_cache() {
        let mut cached = person(29, "Leon", "Draisaitl", "C");
        cached.team_abbr = Some("EDM".into());
        cached.headshot = Some("https://assets.nhle.com/mugs/8477934.png".into());
        let mut row = skater(29, 20252026, "EDM", 5, 5, 5);
        row.team_abbrev = None;
        row.position_code = None;

        let view = season_view(&input(&[], &[row], &[], &[cached]));
        assert_eq!(view[0].first_name, "Leon");
        assert_eq!(view[0].position, "C");
        assert_eq!(view[0].team_abbr.as_deref(), Some("EDM"));
        assert!(view[0].headshot.is_some());
    }

    #[test]
    fn test_missing_everything_defaults_to_empty() {
        let mut row = skater(77, 20252026, "", 0, 0, 0);
        row.team_abbrev = None;
        row.position_code = None;
        let view = season_view(&input(&[], &[row], &[], &[]));
        assert_eq!(view[0].first_name, "");
        assert_eq!(view[0].position, "");
        assert_eq!(view[0].team_abbr, None);
    }

    #[test]
    fn test_dimension_only_players_are_excluded() {
        let dimension = vec![person(1, "Only", "Roster", "D")];
        assert!(season_view(&input(&dimension, &[], &[], &[])).is_empty());
        assert!(career_view(&input(&dimension, &[], &[], &[])).is_empty());
    }
}
