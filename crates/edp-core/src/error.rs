//! Unified error type for the data package tools
//!
//! Every library crate in the workspace returns [`EdpResult`]. The variants
//! keep schema problems, time-index problems and update conflicts apart so
//! callers (and the CLI exit path) can tell them from plain I/O failures.
//!
//! # Example
//!
//! ```ignore
//! use edp_core::{EdpError, EdpResult};
//!
//! fn load_and_stack(path: &str) -> EdpResult<()> {
//!     let frame = edp_io::load_unstacked(path)?;
//!     let rows = edp_ts::stack(&frame)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::schema::RecordKind;

/// Error type for all schema, reshaping and file operations.
#[derive(Error, Debug)]
pub enum EdpError {
    /// I/O errors (file access, directory creation)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Frame errors from polars (shape, dtype, group-by, pivot)
    #[error("Table error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Unrecognized tag or option passed by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A loaded file lacks required columns of its record kind
    #[error("{kind} data is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        kind: RecordKind,
        columns: Vec<String>,
    },

    /// A column name that does not exist on the record kind
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// Cell-level parsing errors (datetimes, series literals, numbers)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Series length disagrees with the periods implied by its time index
    #[error(
        "series '{var_name}' holds {actual} values but its time index implies {expected} periods"
    )]
    SeriesLength {
        var_name: String,
        expected: usize,
        actual: usize,
    },

    /// Tables or rows that must share one time index do not
    #[error("Time index mismatch: {0}")]
    TimeIndexMismatch(String),

    /// An update that would lose or overwrite data
    #[error("Inconsistent update: {0}")]
    InconsistentUpdate(String),
}

/// Convenience type alias for Results using EdpError.
pub type EdpResult<T> = Result<T, EdpError>;

impl From<String> for EdpError {
    fn from(s: String) -> Self {
        EdpError::Validation(s)
    }
}

impl From<&str> for EdpError {
    fn from(s: &str) -> Self {
        EdpError::Validation(s.to_string())
    }
}

impl From<chrono::ParseError> for EdpError {
    fn from(err: chrono::ParseError) -> Self {
        EdpError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_every_name() {
        let err = EdpError::MissingColumns {
            kind: RecordKind::Scalars,
            columns: vec!["region".into(), "tech".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("scalars"));
        assert!(msg.contains("region, tech"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: EdpError = io_err.into();
        assert!(matches!(err, EdpError::Io(_)));
    }

    #[test]
    fn series_length_message() {
        let err = EdpError::SeriesLength {
            var_name: "load".into(),
            expected: 25,
            actual: 24,
        };
        assert_eq!(
            err.to_string(),
            "series 'load' holds 24 values but its time index implies 25 periods"
        );
    }

    #[test]
    fn question_mark_propagates() {
        fn inner() -> EdpResult<()> {
            Err(EdpError::InconsistentUpdate("test".into()))
        }

        fn outer() -> EdpResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(EdpError::InconsistentUpdate(_))));
    }
}
