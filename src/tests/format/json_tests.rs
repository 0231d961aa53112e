//! JSON format tests.

use serde_json::json;

use crate::format::{FORMAT_NAMES, FormatKind, serialize};

#[test]
fn test_json_uses_spacing_as_indent() {
    let bytes = serialize(FormatKind::Json, &json!({ "a": [1] }), 3).unwrap();
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        "{\n   \"a\": [\n      1\n   ]\n}"
    );
}

#[test]
fn test_json_zero_spacing_is_compact() {
    let bytes = serialize(FormatKind::Json, &json!({ "a": 1, "b": "x" }), 0).unwrap();
    assert_eq!(bytes, br#"{"a":1,"b":"x"}"#.to_vec());
}

#[test]
fn test_json_scalars() {
    let bytes = serialize(FormatKind::Json, &json!("plain"), 2).unwrap();
    assert_eq!(bytes, b"\"plain\"".to_vec());
}

#[test]
fn test_format_kind_from_str_is_case_sensitive() {
    assert_eq!(FormatKind::from_str("json"), Some(FormatKind::Json));
    assert_eq!(FormatKind::from_str("yml"), Some(FormatKind::Yaml));
    assert_eq!(FormatKind::from_str("JSON"), None);
    assert_eq!(FormatKind::from_str("xml"), None);
}

#[test]
fn test_every_format_name_parses() {
    for name in FORMAT_NAMES {
        assert!(FormatKind::from_str(name).is_some(), "{name}");
    }
}

#[test]
fn test_extensions() {
    assert_eq!(FormatKind::Json.extension(), "json");
    assert_eq!(FormatKind::Yaml.extension(), "yaml");
    assert_eq!(FormatKind::Cson.extension(), "cson");
    assert_eq!(FormatKind::Csv.to_string(), "csv");
}

#[test]
fn test_always_available_formats() {
    assert!(FormatKind::Json.is_available());
    assert!(FormatKind::Cson.is_available());
    assert_eq!(FormatKind::Yaml.is_available(), cfg!(feature = "yaml"));
    assert_eq!(FormatKind::Csv.is_available(), cfg!(feature = "csv"));
}
