//! Pure, re-entrant computations over player data

pub mod aggregation;
pub mod percentile;
pub mod query;

pub use aggregation::{career_view, latest_seasons, season_view, AggregationInput};
pub use percentile::{percentile_ranks, MetricPercentile, MetricSample, NEUTRAL_PERCENTILE};
pub use query::{paginate, run_query, sort_records, Page, PlayerQuery, SortField, SortOrder};
