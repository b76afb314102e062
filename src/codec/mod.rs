//! Serialization codec for view state.
//!
//! Pure functions converting filter maps, sort specs, column order and column
//! sizing to and from their URL-query and persisted-storage representations.
//! No side effects: reading and writing the actual URL or storage lives in
//! [`crate::sync`].
//!
//! # URL values
//!
//! - A string is written verbatim, unless it would itself parse as JSON
//!   (`"42"`, `"true"`, `"[1]"`); those are JSON-quoted so that decoding
//!   returns the string rather than a number, bool or array.
//! - Any other value is JSON-encoded.
//! - Decoding tries JSON first and falls back to the raw string.
//! - Cleared values (`null`, `""`) are never written: the parameter is deleted.

mod query;

pub use query::QueryParams;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{
    is_cleared, CodecError, ColumnOrder, ColumnSizing, FilterMap, SortMode, SortRule,
};

/// Default prefix shared by all filter parameters.
pub const DEFAULT_FILTER_PREFIX: &str = "filter_";

/// Default name of the sort parameter.
pub const DEFAULT_SORT_PARAM: &str = "sort";

/// Default name of the search parameter.
pub const DEFAULT_SEARCH_PARAM: &str = "search";

// ===== Single values =====

/// Encode one value for a query parameter.
///
/// Returns `None` when the value is cleared and the parameter must be deleted.
///
/// # Examples
///
/// ```
/// # use viewsync::codec::encode_param_value;
/// # use serde_json::json;
/// assert_eq!(encode_param_value(&json!("active")), Some("active".to_string()));
/// assert_eq!(encode_param_value(&json!("42")), Some("\"42\"".to_string()));
/// assert_eq!(encode_param_value(&json!(42)), Some("42".to_string()));
/// assert_eq!(encode_param_value(&json!("")), None);
/// ```
pub fn encode_param_value(value: &Value) -> Option<String> {
    if is_cleared(value) {
        return None;
    }

    match value {
        Value::String(s) if serde_json::from_str::<Value>(s).is_err() => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Decode one query parameter value: JSON if it parses, else the raw string.
pub fn decode_param_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

// ===== Filters =====

/// Write `filters` into `params` under `prefix`.
///
/// Every existing parameter carrying the prefix is removed first, so cleared
/// keys disappear from the query string.
pub fn encode_filters(filters: &FilterMap, prefix: &str, params: &mut QueryParams) {
    params.remove_prefixed(prefix);
    for (key, value) in filters {
        if let Some(encoded) = encode_param_value(value) {
            params.append(format!("{prefix}{key}"), encoded);
        }
    }
}

/// Read the filters stored under `prefix`. Other parameters are ignored.
pub fn decode_filters(params: &QueryParams, prefix: &str) -> FilterMap {
    params
        .iter()
        .filter_map(|(name, raw)| {
            let key = name.strip_prefix(prefix)?;
            let value = decode_param_value(raw);
            (!is_cleared(&value)).then(|| (key.to_owned(), value))
        })
        .collect()
}

// ===== Sort =====

/// Accepts either shape regardless of mode.
#[derive(Deserialize)]
#[serde(untagged)]
enum SortPayload {
    One(SortRule),
    Many(Vec<SortRule>),
}

/// Encode sort rules: an object in single mode, an array in multi mode.
///
/// Returns `None` when nothing is sorted.
pub fn encode_sort(rules: &[SortRule], mode: SortMode) -> Option<String> {
    let encoded = match mode {
        SortMode::Single => serde_json::to_string(rules.first()?),
        SortMode::Multi if rules.is_empty() => return None,
        SortMode::Multi => serde_json::to_string(rules),
    };
    encoded.ok()
}

/// Decode a sort parameter for `mode`.
///
/// Single mode keeps the first rule of an array; multi mode wraps a lone
/// object and drops repeated fields, keeping the first occurrence.
pub fn decode_sort(raw: &str, mode: SortMode) -> Result<Vec<SortRule>, CodecError> {
    let payload: SortPayload = serde_json::from_str(raw).map_err(CodecError::malformed)?;
    let rules = match payload {
        SortPayload::One(rule) => vec![rule],
        SortPayload::Many(rules) => rules,
    };
    Ok(normalize_sort_rules(rules, mode))
}

/// Enforce the sort invariants: one rule per field, at most one rule in single mode.
pub fn normalize_sort_rules(rules: Vec<SortRule>, mode: SortMode) -> Vec<SortRule> {
    let mut seen: Vec<SortRule> = Vec::with_capacity(rules.len());
    for rule in rules {
        if !seen.iter().any(|r| r.field == rule.field) {
            seen.push(rule);
        }
    }
    if mode == SortMode::Single {
        seen.truncate(1);
    }
    seen
}

// ===== Storage payloads =====

/// Serialize any payload to JSON.
pub fn encode_payload<T: Serialize + ?Sized>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(CodecError::encode)
}

/// Deserialize any payload from JSON.
pub fn decode_payload<T: DeserializeOwned>(raw: &str) -> Result<T, CodecError> {
    serde_json::from_str(raw).map_err(CodecError::malformed)
}

/// Encode a column order. An empty order encodes to "no key".
pub fn encode_column_order(order: &ColumnOrder) -> Option<String> {
    if order.is_empty() {
        return None;
    }
    encode_payload(order).ok()
}

/// Decode a stored column order.
pub fn decode_column_order(raw: &str) -> Result<ColumnOrder, CodecError> {
    decode_payload(raw)
}

/// Encode column widths. An empty map encodes to "no key".
pub fn encode_column_sizing(sizing: &ColumnSizing) -> Option<String> {
    if sizing.is_empty() {
        return None;
    }
    encode_payload(sizing).ok()
}

/// Decode stored column widths. Zero widths are rejected as malformed.
pub fn decode_column_sizing(raw: &str) -> Result<ColumnSizing, CodecError> {
    decode_payload(raw)
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
