//! Tests for the view-state codec.

use super::*;
use crate::model::{ColumnId, ColumnWidth, SortDirection};
use serde_json::json;

// ===== Single values =====

#[test]
fn plain_string_is_stored_verbatim() {
    assert_eq!(encode_param_value(&json!("active")), Some("active".to_string()));
}

#[test]
fn json_looking_string_is_quoted() {
    // GIVEN string values that would otherwise decode as number / bool / null
    for s in ["42", "true", "null", "[1,2]", " 7 "] {
        let value = json!(s);

        // WHEN encoded then decoded
        let encoded = encode_param_value(&value).expect("non-empty string is written");
        let decoded = decode_param_value(&encoded);

        // THEN the string survives as a string
        assert_eq!(decoded, value, "round trip of {s:?} via {encoded:?}");
    }
}

#[test]
fn non_string_values_are_json_encoded() {
    assert_eq!(encode_param_value(&json!(5)), Some("5".to_string()));
    assert_eq!(encode_param_value(&json!(false)), Some("false".to_string()));
    assert_eq!(
        encode_param_value(&json!(["a", "b"])),
        Some(r#"["a","b"]"#.to_string())
    );
    assert_eq!(
        encode_param_value(&json!({"min": 1})),
        Some(r#"{"min":1}"#.to_string())
    );
}

#[test]
fn cleared_values_are_never_written() {
    assert_eq!(encode_param_value(&json!(null)), None);
    assert_eq!(encode_param_value(&json!("")), None);
}

#[test]
fn decode_falls_back_to_raw_string() {
    assert_eq!(decode_param_value("active"), json!("active"));
    assert_eq!(decode_param_value("{broken"), json!("{broken"));
}

#[test]
fn decode_parses_json() {
    assert_eq!(decode_param_value("[1,2]"), json!([1, 2]));
    assert_eq!(decode_param_value("3.5"), json!(3.5));
}

// ===== Filters =====

#[test]
fn encode_filters_prefixes_keys() {
    let mut filters = FilterMap::new();
    filters.insert("status".to_string(), json!("active"));
    filters.insert("age".to_string(), json!(30));

    let mut params = QueryParams::new();
    encode_filters(&filters, DEFAULT_FILTER_PREFIX, &mut params);

    insta::assert_snapshot!(params.to_query_string(), @"filter_age=30&filter_status=active");
}

#[test]
fn encode_filters_replaces_stale_prefixed_params_only() {
    let mut params = QueryParams::parse("page=3&filter_old=x&sort=y");
    let mut filters = FilterMap::new();
    filters.insert("new".to_string(), json!("z"));

    encode_filters(&filters, "filter_", &mut params);

    assert_eq!(params.to_query_string(), "page=3&sort=y&filter_new=z");
}

#[test]
fn decode_filters_reads_only_active_prefix() {
    let params = QueryParams::parse("filter_status=active&page=2&f_other=1&filter_ids=%5B1%2C2%5D");

    let filters = decode_filters(&params, "filter_");

    assert_eq!(filters.len(), 2);
    assert_eq!(filters.get("status"), Some(&json!("active")));
    assert_eq!(filters.get("ids"), Some(&json!([1, 2])));
}

#[test]
fn decode_filters_skips_empty_values() {
    let params = QueryParams::parse("filter_status=&filter_kind=null");
    assert!(decode_filters(&params, "filter_").is_empty());
}

#[test]
fn two_prefixes_share_one_query_string() {
    let mut params = QueryParams::new();
    let mut a = FilterMap::new();
    a.insert("x".to_string(), json!(1));
    let mut b = FilterMap::new();
    b.insert("x".to_string(), json!(2));

    encode_filters(&a, "a_", &mut params);
    encode_filters(&b, "b_", &mut params);

    assert_eq!(decode_filters(&params, "a_"), a);
    assert_eq!(decode_filters(&params, "b_"), b);
}

// ===== Sort =====

#[test]
fn single_sort_encodes_as_object() {
    let encoded = encode_sort(&[SortRule::asc("name")], SortMode::Single);
    assert_eq!(
        encoded.as_deref(),
        Some(r#"{"field":"name","direction":"asc"}"#)
    );
}

#[test]
fn multi_sort_encodes_as_array() {
    let encoded = encode_sort(
        &[SortRule::asc("name"), SortRule::desc("age")],
        SortMode::Multi,
    );
    assert_eq!(
        encoded.as_deref(),
        Some(r#"[{"field":"name","direction":"asc"},{"field":"age","direction":"desc"}]"#)
    );
}

#[test]
fn empty_sort_is_not_written() {
    assert_eq!(encode_sort(&[], SortMode::Single), None);
    assert_eq!(encode_sort(&[], SortMode::Multi), None);
}

#[test]
fn decode_sort_single_object() {
    let rules = decode_sort(r#"{"field":"name","direction":"desc"}"#, SortMode::Single)
        .expect("valid sort");
    assert_eq!(rules, vec![SortRule::new("name", SortDirection::Desc)]);
}

#[test]
fn decode_sort_single_mode_keeps_first_of_array() {
    let rules = decode_sort(
        r#"[{"field":"a","direction":"asc"},{"field":"b","direction":"desc"}]"#,
        SortMode::Single,
    )
    .expect("valid sort");
    assert_eq!(rules, vec![SortRule::asc("a")]);
}

#[test]
fn decode_sort_multi_mode_wraps_object_and_dedupes() {
    let rules = decode_sort(r#"{"field":"a","direction":"asc"}"#, SortMode::Multi)
        .expect("valid sort");
    assert_eq!(rules, vec![SortRule::asc("a")]);

    let rules = decode_sort(
        r#"[{"field":"a","direction":"asc"},{"field":"a","direction":"desc"}]"#,
        SortMode::Multi,
    )
    .expect("valid sort");
    assert_eq!(rules, vec![SortRule::asc("a")]);
}

#[test]
fn decode_sort_rejects_garbage() {
    assert!(decode_sort("name:asc", SortMode::Single).is_err());
    assert!(decode_sort(r#"{"field":"a","direction":"up"}"#, SortMode::Single).is_err());
}

// ===== Storage payloads =====

#[test]
fn column_order_round_trips() {
    let order: ColumnOrder = vec![ColumnId::from("b"), ColumnId::from("a")];
    let encoded = encode_column_order(&order).expect("non-empty order");
    assert_eq!(encoded, r#"["b","a"]"#);
    assert_eq!(decode_column_order(&encoded).expect("valid"), order);
}

#[test]
fn empty_layout_payloads_encode_to_no_key() {
    assert_eq!(encode_column_order(&ColumnOrder::new()), None);
    assert_eq!(encode_column_sizing(&ColumnSizing::new()), None);
}

#[test]
fn column_sizing_round_trips() {
    let mut sizing = ColumnSizing::new();
    sizing.insert(ColumnId::from("name"), ColumnWidth::new(180).expect("valid"));
    let encoded = encode_column_sizing(&sizing).expect("non-empty sizing");
    assert_eq!(decode_column_sizing(&encoded).expect("valid"), sizing);
}

#[test]
fn malformed_storage_payload_is_an_error_not_a_panic() {
    assert!(decode_column_sizing("not json").is_err());
    assert!(decode_column_order("{\"a\":1}").is_err());
    assert!(decode_column_sizing(r#"{"a":0}"#).is_err());
}
