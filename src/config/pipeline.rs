//! File-based configuration for an output engine.

use serde::Deserialize;

use super::{BaseOptions, OutputOptions};
use crate::error::{OutputError, ValidationPolicy};

/// Configuration for one output engine, as read from a YAML or JSON file.
///
/// ```yaml
/// base:
///   root: ./out
/// output:
///   output: reports
///   format: csv
///   limit: 500
/// validation: fast_fail
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutportConfig {
    /// Settings shared with every adapter
    #[serde(default)]
    pub base: BaseOptions,
    /// Output options, merged over the defaults while parsing
    #[serde(default)]
    pub output: OutputOptions,
    /// Validation policy: "warn", "fast_fail" or "accumulate"
    #[serde(default)]
    pub validation: Option<String>,
}

impl OutportConfig {
    /// Create a configuration holding only defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base options.
    pub fn with_base(mut self, base: BaseOptions) -> Self {
        self.base = base;
        self
    }

    /// Set the output options.
    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }

    /// Set the validation policy.
    pub fn with_validation(mut self, policy: impl Into<String>) -> Self {
        self.validation = Some(policy.into());
        self
    }

    /// Parse the validation policy; absent means the default.
    pub fn validation_policy(&self) -> Result<ValidationPolicy, OutputError> {
        match self.validation.as_deref() {
            None => Ok(ValidationPolicy::default()),
            Some(raw) => ValidationPolicy::from_str(raw)
                .ok_or_else(|| OutputError::Config(format!("unknown validation policy '{raw}'"))),
        }
    }
}
