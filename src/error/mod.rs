//! Error types and policies for outport.
//!
//! This module provides:
//! - `ValidationPolicy`: Controls how option validation failures are surfaced
//! - `ValidationError`: A single option that violates its rule
//! - `ValidationReport`: The collection of failures from one validation pass
//! - `Stage`: Where in the adapter lifecycle an error occurred
//! - `AdapterError`: Failures raised by destination adapters
//! - `OutputError`: Everything the engine can return to a caller

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::format::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Log every failure and keep going
    #[default]
    Warn,
    /// Stop at the first failing option
    FastFail,
    /// Run every rule, then fail if any of them failed
    Accumulate,
}

impl ValidationPolicy {
    /// Parse a policy from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "warn" => Some(ValidationPolicy::Warn),
            "fast_fail" | "fastfail" => Some(ValidationPolicy::FastFail),
            "accumulate" => Some(ValidationPolicy::Accumulate),
            _ => None,
        }
    }
}

/// A single option that failed its validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("The {option} option must be a string")]
    NotAString { option: String },

    #[error("The {option} option must have a length")]
    Empty { option: String },

    #[error("The {option} option must be a number")]
    NotANumber { option: String },

    #[error("You must use one of the following formats {allowed}. You passed {value}")]
    UnknownFormat { allowed: String, value: String },

    #[error("The output option must be {allowed}, or a folder path. You passed {value}")]
    InvalidOutput { allowed: String, value: String },

    #[error("You can't have an archive file when you have the output option set to {output}")]
    ArchiveNotAllowed { output: String },

    #[error("The archive file must have a file extension of `.zip`. You passed {archive}")]
    ArchiveExtension { archive: String },

    #[error("The archive option can't be used with {output}")]
    ArchiveWithServer { output: String },
}

impl ValidationError {
    /// Name of the option this failure belongs to.
    pub fn option(&self) -> &str {
        match self {
            ValidationError::NotAString { option }
            | ValidationError::Empty { option }
            | ValidationError::NotANumber { option } => option,
            ValidationError::UnknownFormat { .. } => "format",
            ValidationError::InvalidOutput { .. } => "output",
            ValidationError::ArchiveNotAllowed { .. } | ValidationError::ArchiveExtension { .. } => {
                "archive"
            }
            ValidationError::ArchiveWithServer { .. } => "server",
        }
    }
}

/// Every failure collected during one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "output options have {} problem(s):", self.errors.len())?;
        for (i, e) in self.errors.iter().enumerate() {
            writeln!(f, "  #{}: [{}] {}", i + 1, e.option(), e)?;
        }
        Ok(())
    }
}

impl ValidationReport {
    /// Create a report holding a single failure.
    pub fn single(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Check if validation found nothing wrong.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Failures recorded for one option.
    pub fn for_option<'a>(&'a self, option: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.option() == option)
    }
}

impl From<ValidationError> for ValidationReport {
    fn from(error: ValidationError) -> Self {
        Self::single(error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Building the adapter for the resolved destination
    Create,
    /// Running the adapter's initialization hook
    Prepare,
    /// Delivering a payload
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Create => write!(f, "Create"),
            Stage::Prepare => write!(f, "Prepare"),
            Stage::Output => write!(f, "Output"),
        }
    }
}

/// Failures raised by destination adapters.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    /// The document store refused the connection parameters
    #[error("cannot connect to {server}: {reason}")]
    Connection { server: String, reason: String },

    /// The document store is not connected or rejected a write
    #[error("document store error: {0}")]
    Store(String),

    #[error("adapter error: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors returned by `OutputEngine` and `OutputBuilder`.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Options were rejected under a strict validation policy
    #[error("{0}")]
    Invalid(#[from] ValidationReport),

    /// The active adapter failed at some stage of its lifecycle.
    ///
    /// A failed preparation hands the same source to every caller that
    /// waited on it.
    #[error("[{stage}] {destination}: {source}")]
    Adapter {
        stage: Stage,
        destination: String,
        #[source]
        source: Arc<AdapterError>,
    },

    /// The payload could not be turned into a JSON value
    #[error("payload is not serializable: {0}")]
    Payload(#[source] serde_json::Error),

    /// A configuration value could not be interpreted
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl OutputError {
    pub(crate) fn adapter(stage: Stage, destination: impl Into<String>, source: AdapterError) -> Self {
        OutputError::Adapter {
            stage,
            destination: destination.into(),
            source: Arc::new(source),
        }
    }

    /// Stage of an adapter failure, if this is one.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            OutputError::Adapter { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

#[cfg(feature = "miette")]
mod miette_impl;

#[cfg(feature = "miette")]
pub use miette_impl::*;
