//! Read-side service: derived views, player lookups, percentile cards,
//! teams and standings.
//!
//! Everything here reads the remote store on demand and memoizes the
//! expensive results in [`TtlCache`]s. The roster snapshot is consulted for
//! display fallbacks and as the stale-but-available source for season queries.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use super::refresh::roster_query;
use super::roster::RosterService;
use super::ttl_cache::TtlCache;
use crate::adapters::{FilterOp, RemoteStore, SelectQuery};
use crate::analytics::{
    career_view, latest_seasons, percentile_ranks, run_query, season_view, AggregationInput,
    MetricPercentile, MetricSample, Page, PlayerQuery,
};
use crate::config::{AppConfig, LeagueConfig, StoreConfig};
use crate::domain::row::id_field;
use crate::domain::{
    stat_columns, GoalieSeasonRecord, Metric, PlayerCategory, PlayerRecord, Row, SeasonRecord,
    SkaterSeasonRecord, StatsScope,
};
use crate::error::{Result, StatsError};

/// Latest season line for one player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDetail {
    pub player: PlayerRecord,
    pub season_type: PlayerCategory,
    /// `None` when the player has no stat rows
    pub season: Option<SeasonRecord>,
}

/// Data behind the player summary card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerCard {
    pub player: PlayerRecord,
    pub season_type: PlayerCategory,
    pub season: Option<SeasonRecord>,
    /// Empty when no percentile sample is available
    pub percentiles: Vec<MetricPercentile>,
}

/// League-wide metric sample for one category and season
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueSample {
    pub season_type: PlayerCategory,
    pub season_id: Option<u32>,
    pub count: usize,
    pub players: Vec<MetricSample>,
}

impl LeagueSample {
    fn empty(category: PlayerCategory) -> Self {
        Self {
            season_type: category,
            season_id: None,
            count: 0,
            players: Vec::new(),
        }
    }
}

/// Rows from both stat tables, parsed
struct StatRows {
    skaters: Vec<SkaterSeasonRecord>,
    goalies: Vec<GoalieSeasonRecord>,
}

pub struct LeagueService {
    store: Arc<dyn RemoteStore>,
    roster: Arc<RosterService>,
    tables: StoreConfig,
    league: LeagueConfig,
    views: TtlCache<Arc<Vec<PlayerRecord>>>,
    samples: TtlCache<Arc<LeagueSample>>,
    cards: TtlCache<Arc<PlayerCard>>,
}

impl LeagueService {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        roster: Arc<RosterService>,
        config: &AppConfig,
    ) -> Self {
        let ttl = config.cache.ttl();
        Self {
            store,
            roster,
            tables: config.store.clone(),
            league: config.league.clone(),
            views: TtlCache::new(ttl),
            samples: TtlCache::new(ttl),
            cards: TtlCache::new(ttl),
        }
    }

    /// Filtered, sorted, paginated listing over the requested scope
    pub async fn players(
        &self,
        scope: StatsScope,
        query: &PlayerQuery,
    ) -> Result<Page<PlayerRecord>> {
        let records = match scope {
            StatsScope::Season => self.season_records().await?,
            StatsScope::Career => self.view(StatsScope::Career).await.map_err(|e| {
                if e.is_upstream() {
                    StatsError::UpstreamUnavailable(e.to_string())
                } else {
                    e
                }
            })?,
        };
        Ok(run_query(&records, query))
    }

    /// Season view, or the roster snapshot when the store is unreachable
    async fn season_records(&self) -> Result<Arc<Vec<PlayerRecord>>> {
        match self.view(StatsScope::Season).await {
            Ok(records) => Ok(records),
            Err(e) if e.is_upstream() => {
                warn!(error = %e, "season view unavailable, serving roster snapshot");
                Ok(self.roster.get_all().await)
            }
            Err(e) => Err(e),
        }
    }

    /// Memoized derived view for `scope`
    pub async fn view(&self, scope: StatsScope) -> Result<Arc<Vec<PlayerRecord>>> {
        self.views
            .get_or_try_insert_with(scope.as_str(), || async move {
                self.build_view(scope).await.map(Arc::new)
            })
            .await
    }

    async fn build_view(&self, scope: StatsScope) -> Result<Vec<PlayerRecord>> {
        let dimension_query = roster_query(&self.tables.roster_table);
        let (dimension_rows, stats) = tokio::try_join!(
            self.store.select(&dimension_query),
            self.fetch_stat_rows(None)
        )?;

        let dimension: Vec<PlayerRecord> = dimension_rows
            .iter()
            .filter_map(PlayerRecord::from_roster_row)
            .collect();
        let cached = self.roster.get_all().await;
        let input = AggregationInput {
            dimension: &dimension,
            skaters: &stats.skaters,
            goalies: &stats.goalies,
            cached: &cached,
        };

        let view = match scope {
            StatsScope::Season => season_view(&input),
            StatsScope::Career => career_view(&input),
        };
        debug!(
            scope = %scope,
            players = view.len(),
            skater_rows = stats.skaters.len(),
            goalie_rows = stats.goalies.len(),
            "built player view"
        );
        Ok(view)
    }

    /// Both stat tables, optionally narrowed to one player
    async fn fetch_stat_rows(&self, player_id: Option<u64>) -> Result<StatRows> {
        let scoped = |table: &str| {
            let query = stat_rows_query(table);
            match player_id {
                Some(id) => query.eq(stat_columns::PLAYER_ID, id),
                None => query,
            }
        };
        let skater_query = scoped(&self.tables.skater_table);
        let goalie_query = scoped(&self.tables.goalie_table);

        let (skater_rows, goalie_rows) = tokio::try_join!(
            self.store.select(&skater_query),
            self.store.select(&goalie_query)
        )?;

        Ok(StatRows {
            skaters: skater_rows
                .iter()
                .filter_map(SkaterSeasonRecord::from_row)
                .collect(),
            goalies: goalie_rows
                .iter()
                .filter_map(GoalieSeasonRecord::from_row)
                .collect(),
        })
    }

    /// Season-scope record for one player
    pub async fn player(&self, player_id: u64) -> Result<PlayerRecord> {
        let records = self.season_records().await?;
        if let Some(found) = records.iter().find(|p| p.id == player_id) {
            return Ok(found.clone());
        }
        self.roster
            .get(player_id)
            .await
            .ok_or_else(|| StatsError::NotFound(format!("player {player_id}")))
    }

    pub async fn player_detail(&self, player_id: u64) -> Result<PlayerDetail> {
        let stats = self.fetch_stat_rows(Some(player_id)).await?;
        let season = latest_seasons(
            stats
                .skaters
                .into_iter()
                .map(SeasonRecord::Skater)
                .chain(stats.goalies.into_iter().map(SeasonRecord::Goalie)),
        )
        .remove(&player_id);

        let player = match self.player(player_id).await {
            Ok(player) => player,
            // A player with stat rows but no roster entry still gets a detail view
            Err(StatsError::NotFound(_)) if season.is_some() => {
                let cached = self.roster.get_all().await;
                let (skaters, goalies) = match &season {
                    Some(SeasonRecord::Skater(s)) => (vec![s.clone()], Vec::new()),
                    Some(SeasonRecord::Goalie(g)) => (Vec::new(), vec![g.clone()]),
                    None => (Vec::new(), Vec::new()),
                };
                let input = AggregationInput {
                    dimension: &[],
                    skaters: &skaters,
                    goalies: &goalies,
                    cached: &cached,
                };
                season_view(&input)
                    .into_iter()
                    .next()
                    .ok_or_else(|| StatsError::NotFound(format!("player {player_id}")))?
            }
            Err(e) => return Err(e),
        };

        let season_type = match &season {
            Some(row) => row.category(),
            None if player.is_goalie() => PlayerCategory::Goalie,
            None => PlayerCategory::Skater,
        };

        Ok(PlayerDetail {
            player,
            season_type,
            season,
        })
    }

    /// Memoized card data for one player
    pub async fn player_card(&self, player_id: u64) -> Result<Arc<PlayerCard>> {
        let key = player_id.to_string();
        self.cards
            .get_or_try_insert_with(&key, || async move {
                let detail = self.player_detail(player_id).await?;
                let sample = self.league_sample(detail.season_type).await?;
                let percentiles = percentile_ranks(
                    player_id,
                    &sample.players,
                    Metric::for_category(detail.season_type),
                );
                Ok(Arc::new(PlayerCard {
                    player: detail.player,
                    season_type: detail.season_type,
                    season: detail.season,
                    percentiles,
                }))
            })
            .await
    }

    /// Memoized qualifying sample for the latest season of `category`
    pub async fn league_sample(&self, category: PlayerCategory) -> Result<Arc<LeagueSample>> {
        self.samples
            .get_or_try_insert_with(category.as_str(), || async move {
                self.build_sample(category).await.map(Arc::new)
            })
            .await
    }

    async fn build_sample(&self, category: PlayerCategory) -> Result<LeagueSample> {
        let (table, min_games) = match category {
            PlayerCategory::Skater => (&self.tables.skater_table, self.league.skater_min_games),
            PlayerCategory::Goalie => (&self.tables.goalie_table, self.league.goalie_min_games),
        };

        let latest_query = SelectQuery::new(table)
            .columns([stat_columns::SEASON_ID])
            .order_desc(stat_columns::SEASON_ID)
            .limit(1);
        let latest = self.store.select(&latest_query).await?;
        let Some(season_id) = latest
            .first()
            .and_then(|row| id_field(row, stat_columns::SEASON_ID))
            .and_then(|id| u32::try_from(id).ok())
        else {
            return Ok(LeagueSample::empty(category));
        };

        let sample_query = stat_rows_query(table)
            .eq(stat_columns::SEASON_ID, season_id)
            .filter(stat_columns::GAMES_PLAYED, FilterOp::Gte, min_games);
        let rows = self.store.select(&sample_query).await?;

        let metrics = Metric::for_category(category);
        let players: Vec<MetricSample> = rows
            .iter()
            .filter_map(|row| parse_season(category, row))
            .map(|record| MetricSample::from_record(&record, metrics))
            .collect();

        debug!(
            category = %category,
            season_id,
            count = players.len(),
            "built league sample"
        );
        Ok(LeagueSample {
            season_type: category,
            season_id: Some(season_id),
            count: players.len(),
            players,
        })
    }

    /// Sorted distinct team abbreviations in the current snapshot
    pub async fn teams(&self) -> Vec<String> {
        self.roster
            .get_all()
            .await
            .iter()
            .filter_map(|p| p.team_abbr.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Standings rows for the configured season, passed through as stored
    pub async fn standings(&self) -> Result<Vec<Row>> {
        let query = SelectQuery::new(&self.tables.standings_table)
            .eq(stat_columns::SEASON_ID, self.league.current_season)
            .order_desc("points")
            .order_desc("goals_for")
            .order_asc("team_abbrev");
        self.store.select(&query).await
    }
}

/// Stat table read ordered by its (player, season) key
fn stat_rows_query(table: &str) -> SelectQuery {
    SelectQuery::new(table)
        .order_asc(stat_columns::PLAYER_ID)
        .order_asc(stat_columns::SEASON_ID)
}

fn parse_season(category: PlayerCategory, row: &Row) -> Option<SeasonRecord> {
    match category {
        PlayerCategory::Skater => SkaterSeasonRecord::from_row(row).map(SeasonRecord::Skater),
        PlayerCategory::Goalie => GoalieSeasonRecord::from_row(row).map(SeasonRecord::Goalie),
    }
}
