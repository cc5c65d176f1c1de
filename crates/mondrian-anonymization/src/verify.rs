//! Checks on anonymized output that callers can run before publishing it.

use crate::{
    config::{QuasiIdentifier, QuasiIdentifierKind},
    error::Result,
    generalize::AnonymizedRecord,
    record::Value,
};
use itertools::Itertools;

/// Whether every group of rows sharing the same generalized
/// quasi-identifiers holds at least `k` rows.
pub fn is_k_anonymous(records: &[AnonymizedRecord], k: usize) -> bool {
    records
        .iter()
        .map(|record| &record.quasi_identifiers)
        .counts()
        .values()
        .all(|count| *count >= k)
}

/// Parses a `min-max` interval or a single value produced by
/// [`crate::format_interval`].
pub fn parse_interval(interval: &str) -> Option<(f64, f64)> {
    if let Ok(value) = interval.parse::<f64>() {
        return Some((value, value));
    }

    let bytes = interval.as_bytes();
    let separator = (1..bytes.len()).find(|i| bytes[*i] == b'-' && bytes[i - 1].is_ascii_digit())?;
    let min = interval[..separator].parse().ok()?;
    let max = interval[separator + 1..].parse().ok()?;
    Some((min, max))
}

/// Whether `generalized` is a valid generalization of `original`: the
/// interval contains the number, or the label is an ancestor (inclusive) of
/// the categorical value.
pub fn covers(quasi_identifier: &QuasiIdentifier, generalized: &str, original: &Value) -> Result<bool> {
    match (&quasi_identifier.kind, original) {
        (QuasiIdentifierKind::Numerical, Value::Numeric(number)) => Ok(parse_interval(generalized)
            .map_or(false, |(min, max)| min <= *number && *number <= max)),
        (QuasiIdentifierKind::Categorical(hierarchy), value) => Ok(hierarchy
            .ancestor_path(&value.to_string())?
            .contains(&generalized)),
        (QuasiIdentifierKind::Numerical, Value::Categorical(_)) => Ok(false),
    }
}
