//! Validator behavior: dangerous keywords, identifiers, and parameter maps.

use serde_json::json;
use snowflake_mcp_server::models::ParamValue;
use snowflake_mcp_server::validate::{
    DANGEROUS_KEYWORDS, validate_identifier, validate_params, validate_query,
};

#[test]
fn every_dangerous_keyword_is_rejected_case_insensitively() {
    for keyword in DANGEROUS_KEYWORDS {
        for sql in [
            format!("{keyword} FROM t"),
            format!("{} FROM t", keyword.to_lowercase()),
            format!("SELECT x WHERE note = {keyword}"),
        ] {
            assert!(
                validate_query(&sql, false).is_err(),
                "expected rejection for: {sql}"
            );
        }
    }
}

#[test]
fn safe_selects_pass() {
    for sql in [
        "SELECT 1",
        "SELECT id, amount FROM orders WHERE region = :region",
        "SHOW DATABASES",
        "DESCRIBE TABLE orders",
    ] {
        assert!(validate_query(sql, false).is_ok(), "expected pass for: {sql}");
    }
}

#[test]
fn injection_patterns_rejected_even_when_ddl_allowed() {
    for sql in [
        "SELECT 1; DROP TABLE t",
        "SELECT 1 -- trailing comment",
        "SELECT /* inline */ 1",
        "SELECT a FROM t UNION SELECT b FROM u",
        "EXECUTE (something)",
    ] {
        assert!(validate_query(sql, true).is_err(), "expected rejection for: {sql}");
    }
}

#[test]
fn ddl_flag_admits_keywords() {
    assert!(validate_query("CREATE TABLE t (id INT)", true).is_ok());
    assert!(validate_query("TRUNCATE t", true).is_ok());
}

#[test]
fn identifiers_matching_pattern_up_to_255_chars_pass() {
    for ident in ["a", "_a", "A1", "snake_case_name", &"x".repeat(255)] {
        assert!(
            validate_identifier(ident, "identifier").is_ok(),
            "expected pass for: {ident}"
        );
    }
}

#[test]
fn invalid_identifiers_fail() {
    for ident in ["", " ", "1abc", "has space", "has-dash", "has;semi", &"x".repeat(256)] {
        assert!(
            validate_identifier(ident, "identifier").is_err(),
            "expected rejection for: {ident:?}"
        );
    }
}

#[test]
fn params_with_invalid_key_fail() {
    let params = json!({"a;b": 1});
    assert!(validate_params(params.as_object()).is_err());
}

#[test]
fn params_with_collection_value_fail() {
    let params = json!({"a": [1, 2]});
    assert!(validate_params(params.as_object()).is_err());
}

#[test]
fn scalar_params_round_trip_unchanged() {
    let params = json!({"a": "x", "b": 1, "c": null});
    let validated = validate_params(params.as_object()).unwrap();
    assert_eq!(validated.len(), 3);
    assert_eq!(validated["a"], ParamValue::String("x".to_string()));
    assert_eq!(validated["b"], ParamValue::Int(1));
    assert_eq!(validated["c"], ParamValue::Null);
}
