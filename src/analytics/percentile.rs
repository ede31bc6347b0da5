//! League percentile ranks for the player card

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{Metric, SeasonRecord};

/// Neutral rank for a metric the target player has no value for
pub const NEUTRAL_PERCENTILE: u8 = 50;

/// One player's raw values in the league sample. Absent metrics are not in the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub player_id: u64,
    #[serde(flatten)]
    pub values: BTreeMap<Metric, f64>,
}

impl MetricSample {
    pub fn from_record(record: &SeasonRecord, metrics: &[Metric]) -> Self {
        Self {
            player_id: record.player_id(),
            values: metrics
                .iter()
                .filter_map(|m| record.metric(*m).map(|v| (*m, v)))
                .collect(),
        }
    }

    fn value_or_zero(&self, metric: Metric) -> f64 {
        self.values.get(&metric).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricPercentile {
    pub metric: Metric,
    pub label: &'static str,
    pub percentile: u8,
}

/// Percentile of `player_id` for each metric, in `metrics` order.
///
/// Returns an empty list when the sample has fewer than two members or does
/// not contain the player, so callers can tell "no data" apart from all 50s.
pub fn percentile_ranks(
    player_id: u64,
    sample: &[MetricSample],
    metrics: &[Metric],
) -> Vec<MetricPercentile> {
    if sample.len() < 2 {
        return Vec::new();
    }
    let Some(target) = sample.iter().find(|s| s.player_id == player_id) else {
        return Vec::new();
    };

    let others = (sample.len() - 1) as f64;
    metrics
        .iter()
        .map(|&metric| {
            let percentile = match target.values.get(&metric) {
                None => NEUTRAL_PERCENTILE,
                Some(&value) => {
                    let below = sample
                        .iter()
                        .filter(|s| s.value_or_zero(metric) < value)
                        .count() as f64;
                    let mut pct = (below / others * 100.0).round_ties_even();
                    if metric.lower_is_better() {
                        pct = 100.0 - pct;
                    }
                    pct.clamp(0.0, 100.0) as u8
                }
            };
            MetricPercentile {
                metric,
                label: metric.label(),
                percentile,
            }
        })
        .collect()
}
