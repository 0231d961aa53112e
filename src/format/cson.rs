//! CSON (CoffeeScript object notation) writer.
//!
//! Top-level objects are written without braces, nested objects use
//! indentation, arrays put one item per line.

use serde_json::{Map, Value};

pub(crate) fn to_string(value: &Value, spacing: usize) -> String {
    // indentation is significant in CSON, so never go below one column
    let unit = spacing.max(1);
    let mut out = String::new();
    match value {
        Value::Object(map) if !map.is_empty() => write_entries(&mut out, map, 0, unit),
        other => {
            write_inline(&mut out, other, 0, unit);
            out.push('\n');
        }
    }
    out
}

fn write_entries(out: &mut String, map: &Map<String, Value>, depth: usize, unit: usize) {
    for (key, value) in map {
        pad(out, depth, unit);
        write_key(out, key);
        out.push(':');
        match value {
            Value::Object(inner) if !inner.is_empty() => {
                out.push('\n');
                write_entries(out, inner, depth + 1, unit);
            }
            other => {
                out.push(' ');
                write_inline(out, other, depth, unit);
                out.push('\n');
            }
        }
    }
}

fn write_inline(out: &mut String, value: &Value, depth: usize, unit: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for item in items {
                pad(out, depth + 1, unit);
                write_inline(out, item, depth + 1, unit);
                out.push('\n');
            }
            pad(out, depth, unit);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{\n");
            write_entries(out, map, depth + 1, unit);
            pad(out, depth, unit);
            out.push('}');
        }
    }
}

fn write_key(out: &mut String, key: &str) {
    let bare = key
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if bare {
        out.push_str(key);
    } else {
        write_string(out, key);
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('\'');
}

fn pad(out: &mut String, depth: usize, unit: usize) {
    for _ in 0..depth * unit {
        out.push(' ');
    }
}
