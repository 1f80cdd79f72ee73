//! Error types for telemetry capture and persistence.
//!
//! All errors implement `std::error::Error` and carry enough context (field
//! names, file paths) to tell which side of the pipeline failed.
//!
//! ## Error Categories
//!
//! - **Telemetry Errors**: the host could not answer a car-state query, or
//!   answered with a value of the wrong shape
//! - **File Errors**: the session CSV could not be created, written or flushed
//! - **Parse Errors**: truncated spline text, replay rows or configuration that
//!   do not parse
//! - **Writer Errors**: the background writer is gone or died abnormally
//!
//! ## Recovery
//!
//! ```rust
//! use metricdump::DumpError;
//!
//! let error = DumpError::telemetry_failed("RPM", "car not loaded");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for metricdump operations.
pub type Result<T, E = DumpError> = std::result::Result<T, E>;

/// Main error type for metricdump operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DumpError {
    #[error("Telemetry query for '{field}' failed: {reason}")]
    Telemetry { field: String, reason: String },

    #[error("Telemetry field '{field}' has unexpected shape: expected {expected}, found {found}")]
    TypeMismatch { field: String, expected: &'static str, found: String },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Session file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Writer has stopped; sample channel is closed")]
    WriterStopped,

    #[error("Writer thread panicked")]
    WriterPanicked,

    #[error("Background task failed: {details}")]
    Task { details: String },
}

impl DumpError {
    /// Returns whether the operation may succeed if attempted again.
    ///
    /// Only telemetry queries qualify: the next frame re-reads every field.
    pub fn is_retryable(&self) -> bool {
        match self {
            DumpError::Telemetry { .. } => true,
            DumpError::TypeMismatch { .. } => true,
            DumpError::Parse { .. } => false,
            DumpError::File { .. } => false,
            DumpError::Csv { .. } => false,
            DumpError::Config { .. } => false,
            DumpError::WriterStopped => false,
            DumpError::WriterPanicked => false,
            DumpError::Task { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            DumpError::Telemetry { .. } => vec![
                "Ensure a session is loaded in the simulator",
                "Check the car index refers to a car on track",
            ],
            DumpError::TypeMismatch { .. } => vec![
                "Check the simulator version exposes the field in the expected form",
                "Verify the speed unit configuration names a supported variant",
            ],
            DumpError::Parse { .. } => vec![
                "Check the input text is a metricdump CSV or YAML file",
                "Verify the file was not truncated while being written",
            ],
            DumpError::File { .. } | DumpError::Csv { .. } => vec![
                "Ensure sufficient disk space",
                "Check write permissions on the output directory",
            ],
            DumpError::Config { .. } => vec!["Fix the configuration value named in the error"],
            DumpError::WriterStopped | DumpError::WriterPanicked => vec![
                "Shut the session down to collect the writer error",
                "Start a new session to resume recording",
            ],
            DumpError::Task { .. } => vec!["Check the runtime was not shut down mid-session"],
        }
    }

    /// Helper constructor for host query failures.
    pub fn telemetry_failed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DumpError::Telemetry { field: field.into(), reason: reason.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DumpError::File { path: path.into(), source }
    }

    /// Helper constructor for CSV errors with path context.
    pub fn csv_error(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        DumpError::Csv { path: path.into(), source }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        DumpError::Parse { context: context.into(), details: details.into() }
    }
}

impl From<std::io::Error> for DumpError {
    fn from(err: std::io::Error) -> Self {
        DumpError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn error_messages_carry_their_context(
            field in "\\w+",
            reason in ".*",
            details in ".*"
        ) {
            let telemetry = DumpError::telemetry_failed(field.clone(), reason.clone());
            let message = telemetry.to_string();
            prop_assert!(message.contains(&field));
            prop_assert!(message.contains(&reason));

            let parse = DumpError::parse_error("spline truncation", details.clone());
            prop_assert!(parse.to_string().contains(&details));
        }

        #[test]
        fn io_errors_convert_to_file_errors(reason in ".*") {
            let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, reason.clone());
            match DumpError::from(io_err) {
                DumpError::File { source, .. } => prop_assert_eq!(source.to_string(), reason),
                other => prop_assert!(false, "Expected File error, got {:?}", other),
            }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<DumpError>();

        let error = DumpError::WriterStopped;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn file_errors_expose_their_source() {
        let error = DumpError::file_error(
            "/tmp/metricdump_a_b.csv",
            std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
        );
        let source = std::error::Error::source(&error).expect("source should be chained");
        assert_eq!(source.to_string(), "disk full");
        assert!(error.to_string().contains("metricdump_a_b.csv"));
    }

    #[test]
    fn only_query_failures_are_retryable() {
        assert!(DumpError::telemetry_failed("Gear", "missing").is_retryable());
        assert!(!DumpError::WriterStopped.is_retryable());
        assert!(!DumpError::parse_error("ctx", "bad").is_retryable());

        for error in [
            DumpError::telemetry_failed("Gear", "missing"),
            DumpError::WriterStopped,
            DumpError::Config { reason: "empty".into() },
        ] {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }
}
