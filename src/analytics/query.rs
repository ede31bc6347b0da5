//! Name/position/team filtering, stable sorting and pagination over player views

use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::PlayerRecord;
use crate::error::StatsError;

/// Allow-listed sort keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Points,
    Goals,
    Assists,
    GamesPlayed,
    FirstName,
    LastName,
}

impl SortField {
    /// `None` for names outside the allow-list; callers leave order untouched
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "points" => Some(SortField::Points),
            "goals" => Some(SortField::Goals),
            "assists" => Some(SortField::Assists),
            "gamesPlayed" => Some(SortField::GamesPlayed),
            "firstName" => Some(SortField::FirstName),
            "lastName" => Some(SortField::LastName),
            _ => None,
        }
    }

    fn compare(&self, a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
        match self {
            SortField::Points => a.points.cmp(&b.points),
            SortField::Goals => a.goals.cmp(&b.goals),
            SortField::Assists => a.assists.cmp(&b.assists),
            SortField::GamesPlayed => a.games_played.cmp(&b.games_played),
            SortField::FirstName => cmp_ignore_case(&a.first_name, &b.first_name),
            SortField::LastName => cmp_ignore_case(&a.last_name, &b.last_name),
        }
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "" | "desc" => Ok(SortOrder::Desc),
            other => Err(StatsError::Validation(format!(
                "sort_order must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }
}

/// Parameters of one player listing request, already validated at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerQuery {
    pub q: String,
    pub position: String,
    pub team: String,
    pub sort_by: String,
    pub sort_order: SortOrder,
    /// 1-indexed
    pub page: usize,
    pub limit: usize,
}

impl Default for PlayerQuery {
    fn default() -> Self {
        Self {
            q: String::new(),
            position: String::new(),
            team: String::new(),
            sort_by: "points".to_string(),
            sort_order: SortOrder::Desc,
            page: 1,
            limit: 20,
        }
    }
}

/// One page of results plus the pre-pagination total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: usize,
    pub limit: usize,
    pub total: usize,
}

/// Filter, sort, then paginate `records`
pub fn run_query(records: &[PlayerRecord], query: &PlayerQuery) -> Page<PlayerRecord> {
    let name = query.q.trim().to_lowercase();
    let position = query.position.trim();
    let team = query.team.trim();

    let mut filtered: Vec<PlayerRecord> = records
        .iter()
        .filter(|p| matches_name(p, &name))
        .filter(|p| position.is_empty() || p.position.eq_ignore_ascii_case(position))
        .filter(|p| {
            team.is_empty()
                || p.team_abbr
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case(team))
        })
        .cloned()
        .collect();

    if let Some(field) = SortField::parse(&query.sort_by) {
        sort_records(&mut filtered, field, query.sort_order);
    }

    paginate(filtered, query.page, query.limit)
}

/// `needle` must already be lowercased; empty matches everything
fn matches_name(player: &PlayerRecord, needle: &str) -> bool {
    needle.is_empty()
        || player.first_name.to_lowercase().contains(needle)
        || player.last_name.to_lowercase().contains(needle)
}

/// Stable sort; equal keys keep their prior relative order in both directions
pub fn sort_records(records: &mut [PlayerRecord], field: SortField, order: SortOrder) {
    match order {
        SortOrder::Asc => records.sort_by(|a, b| field.compare(a, b)),
        SortOrder::Desc => records.sort_by(|a, b| field.compare(b, a)),
    }
}

/// Slice `[(page-1)*limit, page*limit)` clipped to the input; out-of-range pages are empty
pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> Page<T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let total = items.len();
    let offset = (page - 1).saturating_mul(limit);

    let data = if offset >= total {
        Vec::new()
    } else {
        items.into_iter().skip(offset).take(limit).collect()
    };

    Page {
        data,
        page,
        limit,
        total,
    }
}
