//! Loosely-typed rows returned by the remote store and the coercion rules
//! applied when projecting them onto typed records.
//!
//! Numbers are accepted as JSON numbers or numeric strings. Anything absent or
//! non-numeric reads as 0 for counting stats; text fields read as absent.

use serde_json::Value;

/// One row from the remote store, keyed by column name
pub type Row = serde_json::Map<String, Value>;

fn numeric(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Non-negative integer field; absent, null, negative or non-numeric reads as 0
pub fn count_field(row: &Row, key: &str) -> u32 {
    row.get(key)
        .and_then(numeric)
        .filter(|n| *n > 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
        .unwrap_or(0)
}

/// Metric field used for percentile ranking.
///
/// `None` only when the column is missing or null. A present but non-numeric
/// value coerces to 0.
pub fn metric_field(row: &Row, key: &str) -> Option<f64> {
    match row.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(numeric(v).unwrap_or(0.0)),
    }
}

/// Identifier field (player id, season id). Non-numeric ids are rejected.
pub fn id_field(row: &Row, key: &str) -> Option<u64> {
    let value = row.get(key)?;
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Trimmed, non-empty text field
pub fn text_field(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
