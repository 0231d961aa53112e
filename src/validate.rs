//! Option validation.
//!
//! Every recognized option has a rule that inspects its value together with
//! the full option set. Options without a rule are ignored. How failures are
//! surfaced is decided by a `ValidationPolicy`.

use std::path::Path;

use serde_json::Value;
use tracing::error;

use crate::adapter::{OUTPUT_TYPES, is_server};
use crate::config::OutputOptions;
use crate::error::{ValidationError, ValidationPolicy, ValidationReport};
use crate::format::FORMAT_NAMES;

/// A validation rule: the option's value plus the whole option set.
pub type Rule = fn(&Value, &OutputOptions) -> Result<(), ValidationError>;

/// Look up the rule for an option name.
pub fn rule_for(name: &str) -> Option<Rule> {
    let rule: Rule = match name {
        "format" => validate_format,
        "spacing" => validate_spacing,
        "limit" => validate_limit,
        "output" => validate_output,
        "archive" => validate_archive,
        "server" => validate_server,
        "bucket" => validate_bucket,
        "username" => validate_username,
        "password" => validate_password,
        _ => return None,
    };
    Some(rule)
}

/// Run every rule over `options`, in option-name order.
///
/// - `Warn` logs each failure and always returns `Ok` with the full report.
/// - `FastFail` returns `Err` holding the first failure.
/// - `Accumulate` returns `Err` holding every failure, if there is any.
pub fn validate(
    options: &OutputOptions,
    policy: ValidationPolicy,
) -> Result<ValidationReport, ValidationReport> {
    let mut report = ValidationReport::default();

    for (name, value) in options.iter() {
        let Some(rule) = rule_for(name) else {
            continue;
        };
        if let Err(e) = rule(value, options) {
            if matches!(policy, ValidationPolicy::FastFail) {
                return Err(ValidationReport::single(e));
            }
            report.errors.push(e);
        }
    }

    match policy {
        ValidationPolicy::Warn => {
            for e in &report.errors {
                error!(option = e.option(), "{e}");
            }
            Ok(report)
        }
        _ if report.is_empty() => Ok(report),
        _ => Err(report),
    }
}

/// Require a non-empty string.
pub fn require_string<'a>(value: &'a Value, option: &str) -> Result<&'a str, ValidationError> {
    match value {
        Value::String(s) if s.is_empty() => Err(ValidationError::Empty {
            option: option.to_string(),
        }),
        Value::String(s) => Ok(s),
        _ => Err(ValidationError::NotAString {
            option: option.to_string(),
        }),
    }
}

fn require_number(value: &Value, option: &str) -> Result<(), ValidationError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(ValidationError::NotANumber {
            option: option.to_string(),
        })
    }
}

/// Truthiness of a loosely typed option value: `false`, `null`, zero and
/// the empty string are false; every array and object is true.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn has_extension(path: &str) -> bool {
    Path::new(path).extension().is_some()
}

pub fn validate_format(value: &Value, _options: &OutputOptions) -> Result<(), ValidationError> {
    let format = require_string(value, "format")?;
    if FORMAT_NAMES.contains(&format) {
        return Ok(());
    }
    Err(ValidationError::UnknownFormat {
        allowed: FORMAT_NAMES.join(","),
        value: format.to_string(),
    })
}

pub fn validate_spacing(value: &Value, _options: &OutputOptions) -> Result<(), ValidationError> {
    require_number(value, "spacing")
}

pub fn validate_limit(value: &Value, _options: &OutputOptions) -> Result<(), ValidationError> {
    require_number(value, "limit")
}

/// A named destination, or a folder path. A path with an extension looks
/// like a file, which the folder adapter cannot honor.
pub fn validate_output(value: &Value, _options: &OutputOptions) -> Result<(), ValidationError> {
    let output = require_string(value, "output")?;
    if OUTPUT_TYPES.contains(&output) || !has_extension(output) {
        return Ok(());
    }
    Err(ValidationError::InvalidOutput {
        allowed: OUTPUT_TYPES.join(", "),
        value: output.to_string(),
    })
}

pub fn validate_archive(value: &Value, options: &OutputOptions) -> Result<(), ValidationError> {
    let Value::String(archive) = value else {
        return Err(ValidationError::NotAString {
            option: "archive".into(),
        });
    };

    // no archive file specified
    if archive.is_empty() {
        return Ok(());
    }

    if let Some(output @ ("return" | "console")) = options.output() {
        return Err(ValidationError::ArchiveNotAllowed {
            output: output.to_string(),
        });
    }

    if Path::new(archive).extension().and_then(|e| e.to_str()) != Some("zip") {
        return Err(ValidationError::ArchiveExtension {
            archive: archive.clone(),
        });
    }
    Ok(())
}

pub fn validate_server(value: &Value, options: &OutputOptions) -> Result<(), ValidationError> {
    let output = options.output();
    if !is_server(output) {
        return Ok(());
    }
    if options.get("archive").is_some_and(is_truthy) {
        return Err(ValidationError::ArchiveWithServer {
            output: output.unwrap_or_default().to_string(),
        });
    }
    require_string(value, "server").map(|_| ())
}

pub fn validate_bucket(value: &Value, options: &OutputOptions) -> Result<(), ValidationError> {
    server_credential(value, options, "bucket")
}

pub fn validate_username(value: &Value, options: &OutputOptions) -> Result<(), ValidationError> {
    server_credential(value, options, "username")
}

pub fn validate_password(value: &Value, options: &OutputOptions) -> Result<(), ValidationError> {
    server_credential(value, options, "password")
}

fn server_credential(
    value: &Value,
    options: &OutputOptions,
    option: &str,
) -> Result<(), ValidationError> {
    if !is_server(options.output()) {
        return Ok(());
    }
    require_string(value, option).map(|_| ())
}
