//! Serialization formats for byte-based destinations.
//!
//! This module provides:
//! - `FormatKind`: The formats an output can be rendered in
//! - `FormatError`: Errors that can occur while rendering
//! - `serialize`: Render a payload with a given indentation width

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

mod cson;
#[cfg(feature = "csv")]
mod csv;

/// Every accepted spelling of the `format` option.
pub const FORMAT_NAMES: [&str; 5] = ["json", "csv", "yaml", "yml", "cson"];

/// Represents the supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// JSON format
    Json,
    /// CSV format, one row per record
    Csv,
    /// YAML format (`yaml` or `yml`)
    Yaml,
    /// CoffeeScript object notation
    Cson,
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatKind::Json => write!(f, "json"),
            FormatKind::Csv => write!(f, "csv"),
            FormatKind::Yaml => write!(f, "yaml"),
            FormatKind::Cson => write!(f, "cson"),
        }
    }
}

impl FormatKind {
    /// Parse a format kind from the `format` option.
    ///
    /// Matching is case-sensitive, mirroring the option validator.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "json" => Some(FormatKind::Json),
            "csv" => Some(FormatKind::Csv),
            "yaml" | "yml" => Some(FormatKind::Yaml),
            "cson" => Some(FormatKind::Cson),
            _ => None,
        }
    }

    /// File extension used when writing this format to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatKind::Json => "json",
            FormatKind::Csv => "csv",
            FormatKind::Yaml => "yaml",
            FormatKind::Cson => "cson",
        }
    }

    /// Check if this format is available (feature enabled).
    pub fn is_available(&self) -> bool {
        match self {
            FormatKind::Json | FormatKind::Cson => true,

            #[cfg(feature = "yaml")]
            FormatKind::Yaml => true,
            #[cfg(not(feature = "yaml"))]
            FormatKind::Yaml => false,

            #[cfg(feature = "csv")]
            FormatKind::Csv => true,
            #[cfg(not(feature = "csv"))]
            FormatKind::Csv => false,
        }
    }
}

/// Errors that can occur during format operations.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Format feature not enabled
    #[error("Format '{0}' is not enabled. Enable the corresponding feature.")]
    NotEnabled(FormatKind),

    /// The payload shape cannot be represented in this format
    #[error("Format '{kind}' cannot represent this payload: {reason}")]
    Unsupported { kind: FormatKind, reason: String },

    /// Serialization error
    #[error("Serde error: {0}")]
    Serde(Box<dyn std::error::Error + Send + Sync>),
}

/// Serialize a payload using the specified format.
///
/// `spacing` is the indentation width; formats without configurable
/// indentation ignore it.
pub fn serialize(kind: FormatKind, value: &Value, spacing: usize) -> Result<Vec<u8>, FormatError> {
    match kind {
        FormatKind::Json => serialize_json(value, spacing),

        FormatKind::Cson => Ok(cson::to_string(value, spacing).into_bytes()),

        #[cfg(feature = "yaml")]
        FormatKind::Yaml => serde_yaml::to_string(value)
            .map(|s| s.into_bytes())
            .map_err(|e| FormatError::Serde(Box::new(e))),

        #[cfg(feature = "csv")]
        FormatKind::Csv => csv::serialize(value),

        #[allow(unreachable_patterns)]
        _ => Err(FormatError::NotEnabled(kind)),
    }
}

fn serialize_json(value: &Value, spacing: usize) -> Result<Vec<u8>, FormatError> {
    if spacing == 0 {
        return serde_json::to_vec(value).map_err(|e| FormatError::Serde(Box::new(e)));
    }

    let indent = vec![b' '; spacing];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut ser = serde_json::Serializer::with_formatter(Vec::new(), formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| FormatError::Serde(Box::new(e)))?;
    Ok(ser.into_inner())
}
