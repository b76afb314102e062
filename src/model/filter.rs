//! Filter map.

use serde_json::Value;
use std::collections::BTreeMap;

/// Active filters keyed by filter name.
///
/// # Invariants
/// - A cleared filter is absent from the map, never present as `null` or `""`.
///
/// Values are arbitrary JSON. A `BTreeMap` keeps URL output deterministic.
pub type FilterMap = BTreeMap<String, Value>;

/// Whether a value means "no filter".
///
/// `null` and the empty string both clear a key. An empty string is therefore
/// not representable as an active filter value.
pub fn is_cleared(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_empty_string_are_cleared() {
        assert!(is_cleared(&Value::Null));
        assert!(is_cleared(&json!("")));
    }

    #[test]
    fn falsy_but_meaningful_values_are_not_cleared() {
        assert!(!is_cleared(&json!(0)));
        assert!(!is_cleared(&json!(false)));
        assert!(!is_cleared(&json!([])));
        assert!(!is_cleared(&json!(" ")));
    }
}
