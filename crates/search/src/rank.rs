//! Score parsing and top-k ranking.
//!
//! Scores arrive string-encoded and are compared as IEEE-754 doubles. The
//! sort direction comes from the collection's distance function via
//! [`ScoreOrdering`], never from an assumption baked into this module.

use std::cmp::Ordering;

use serde_json::Value;
use store::ScoreOrdering;

use crate::{SearchError, SearchHit};

/// Parse a wire score. The store encodes scores as strings; numeric JSON
/// values are also accepted.
pub fn parse_score(value: Option<&Value>) -> Result<f64, SearchError> {
    match value {
        Some(Value::String(raw)) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| SearchError::MalformedScore(format!("not a number: {raw:?}"))),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| SearchError::MalformedScore(format!("not a double: {n}"))),
        Some(other) => Err(SearchError::MalformedScore(format!(
            "unexpected score value: {other}"
        ))),
        None => Err(SearchError::MalformedScore("score field missing".into())),
    }
}

/// Order best-first and keep the top `k`.
///
/// The sort is stable, so hits with equal scores keep the store's original
/// result order — tie ordering is reproducible given the same input order.
/// Truncation keeps `min(k, len)` entries; fewer results than `k` is a valid
/// outcome, not an error.
pub fn rank(mut hits: Vec<SearchHit>, ordering: ScoreOrdering, k: usize) -> Vec<SearchHit> {
    hits.sort_by(|a, b| compare(ordering, a.score, b.score));
    hits.truncate(k.min(hits.len()));
    hits
}

/// Best-first comparison for the given ordering. Incomparable scores (NaN)
/// are treated as equal so the stable sort leaves their relative order alone.
fn compare(ordering: ScoreOrdering, a: f64, b: f64) -> Ordering {
    let ascending = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    match ordering {
        ScoreOrdering::HigherIsBetter => ascending.reverse(),
        ScoreOrdering::LowerIsBetter => ascending,
    }
}
