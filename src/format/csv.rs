//! CSV rendering of JSON records.

use serde_json::{Map, Value};

use super::{FormatError, FormatKind};

/// Render an object or an array of objects as CSV.
///
/// The header row is the union of keys in first-seen order; missing cells are
/// left empty.
pub(crate) fn serialize(value: &Value) -> Result<Vec<u8>, FormatError> {
    let rows: Vec<&Map<String, Value>> = match value {
        Value::Object(obj) => vec![obj],
        Value::Array(arr) => arr
            .iter()
            .map(|item| match item {
                Value::Object(obj) => Ok(obj),
                _ => Err(unsupported("every array item must be an object")),
            })
            .collect::<Result<_, _>>()?,
        _ => return Err(unsupported("CSV format requires an array or object")),
    };

    let mut headers: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }

    let mut wtr = ::csv::Writer::from_writer(Vec::new());
    if !headers.is_empty() {
        wtr.write_record(&headers)
            .map_err(|e| FormatError::Serde(Box::new(e)))?;
    }

    for row in rows {
        let record: Vec<String> = headers
            .iter()
            .map(|h| match row.get(*h) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(v) => v.to_string(),
            })
            .collect();
        wtr.write_record(&record)
            .map_err(|e| FormatError::Serde(Box::new(e)))?;
    }

    wtr.into_inner()
        .map_err(|e| FormatError::Serde(Box::new(e)))
}

fn unsupported(reason: &str) -> FormatError {
    FormatError::Unsupported {
        kind: FormatKind::Csv,
        reason: reason.to_string(),
    }
}
