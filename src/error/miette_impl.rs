//! Miette integration for pretty error reporting.

use miette::{Diagnostic, Severity};
use thiserror::Error;

use super::{OutputError, ValidationReport};

/// A diagnostic wrapper for output errors compatible with miette.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct OutputDiagnostic {
    /// The error message
    pub message: String,

    #[source]
    /// The underlying error source
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,

    #[help]
    /// Help text for the user
    pub help: Option<String>,

    #[diagnostic(severity)]
    /// Severity level
    pub severity: Severity,
}

impl From<ValidationReport> for OutputDiagnostic {
    fn from(report: ValidationReport) -> Self {
        let help = report
            .errors
            .first()
            .map(|e| format!("Check the `{}` option", e.option()));
        OutputDiagnostic {
            message: report.to_string(),
            source: None,
            help,
            severity: Severity::Error,
        }
    }
}

impl From<OutputError> for OutputDiagnostic {
    fn from(e: OutputError) -> Self {
        match e {
            OutputError::Invalid(report) => OutputDiagnostic::from(report),
            OutputError::Adapter {
                stage,
                destination,
                source,
            } => OutputDiagnostic {
                message: format!("[{stage}] on '{destination}'"),
                source: Some(Box::new(source)),
                help: Some("Check the destination settings and that it is reachable".into()),
                severity: Severity::Error,
            },
            other => OutputDiagnostic {
                message: other.to_string(),
                source: None,
                help: None,
                severity: Severity::Error,
            },
        }
    }
}

impl From<OutputError> for miette::Report {
    fn from(e: OutputError) -> Self {
        miette::Report::new(OutputDiagnostic::from(e))
    }
}
