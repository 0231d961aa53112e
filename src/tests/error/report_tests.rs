//! Tests for validation reports and output errors.

use crate::error::{AdapterError, OutputError, Stage, ValidationError, ValidationReport};
use crate::format::{FormatError, FormatKind};

fn two_failures() -> ValidationReport {
    ValidationReport {
        errors: vec![
            ValidationError::ArchiveExtension {
                archive: "notes.txt".into(),
            },
            ValidationError::Empty {
                option: "username".into(),
            },
        ],
    }
}

#[test]
fn report_lists_each_failure_with_its_option() {
    assert_eq!(
        two_failures().to_string(),
        "output options have 2 problem(s):\n\
         \x20 #1: [archive] The archive file must have a file extension of `.zip`. You passed notes.txt\n\
         \x20 #2: [username] The username option must have a length\n"
    );
}

#[test]
fn report_filters_by_option() {
    let report = two_failures();

    assert_eq!(report.len(), 2);
    assert_eq!(report.for_option("username").count(), 1);
    assert_eq!(report.for_option("format").count(), 0);
    assert!(ValidationReport::default().is_empty());
}

#[test]
fn single_error_converts_to_report() {
    let report: ValidationReport = ValidationError::NotANumber {
        option: "limit".into(),
    }
    .into();
    assert_eq!(report.len(), 1);
    assert_eq!(report.errors[0].to_string(), "The limit option must be a number");
}

#[test]
fn failure_messages_name_the_offending_value() {
    let format = ValidationError::UnknownFormat {
        allowed: "json,csv".into(),
        value: "xml".into(),
    };
    assert_eq!(
        format.to_string(),
        "You must use one of the following formats json,csv. You passed xml"
    );
    assert_eq!(format.option(), "format");

    let archive = ValidationError::ArchiveNotAllowed {
        output: "console".into(),
    };
    assert_eq!(
        archive.to_string(),
        "You can't have an archive file when you have the output option set to console"
    );

    let server = ValidationError::ArchiveWithServer {
        output: "couchbase".into(),
    };
    assert_eq!(server.option(), "server");
}

#[test]
fn adapter_errors_carry_their_stage() {
    let err = OutputError::adapter(
        Stage::Create,
        "couchbase",
        AdapterError::Connection {
            server: "db.local".into(),
            reason: "refused".into(),
        },
    );

    assert_eq!(err.stage(), Some(Stage::Create));
    assert_eq!(
        err.to_string(),
        "[Create] couchbase: cannot connect to db.local: refused"
    );
    assert_eq!(OutputError::Config("x".into()).stage(), None);
}

#[test]
fn format_errors_pass_through_adapter_errors() {
    let err = AdapterError::from(FormatError::NotEnabled(FormatKind::Csv));
    assert_eq!(
        err.to_string(),
        "Format 'csv' is not enabled. Enable the corresponding feature."
    );
}

#[test]
fn invalid_options_display_the_report() {
    let err = OutputError::from(two_failures());
    assert!(err.to_string().starts_with("output options have 2 problem(s):"));
    assert_eq!(err.stage(), None);
}
