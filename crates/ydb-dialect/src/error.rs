//! Error types for the dialect facade.

use std::panic::Location;

use ydb_sql_core::error::{DialectError, ErrorKind};

/// Boxed error returned by a driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while talking to YDB through the dialect.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Translation, planning or capability error.
    #[error(transparent)]
    Dialect(#[from] DialectError),

    /// The driver failed while performing an operation.
    #[error("{operation} failed at {location}: {source}")]
    Driver {
        /// What the dialect was doing.
        operation: String,
        /// Where the failure was wrapped.
        location: &'static Location<'static>,
        /// The driver error.
        source: DriverError,
    },

    /// The index was created under its new name but the old one could not
    /// be dropped. Both indexes now exist.
    #[error(
        "rename index {old} to {new} on {table}: index {new} was created but dropping {old} failed, \
         both indexes now exist: {source}"
    )]
    PartialRename {
        /// Full table path.
        table: String,
        /// Previous index name, still present.
        old: String,
        /// New index name, already created.
        new: String,
        /// Failure of the drop.
        source: Box<Error>,
    },

    /// IO error (reading schema or config files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed schema or config file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wraps a driver error with the operation and the caller location.
    #[track_caller]
    pub fn driver(operation: impl Into<String>, source: impl Into<DriverError>) -> Self {
        Self::Driver {
            operation: operation.into(),
            location: Location::caller(),
            source: source.into(),
        }
    }

    /// Returns the class of a dialect error, `None` for driver, IO and
    /// rename failures.
    #[must_use]
    pub const fn dialect_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Dialect(err) => Some(err.kind()),
            _ => None,
        }
    }

    /// Returns true for capability gaps.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.dialect_kind(), Some(ErrorKind::Unsupported))
    }

    /// Returns true when a named index or field was not found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.dialect_kind(), Some(ErrorKind::NotFound))
    }
}

/// Result type for dialect operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use ydb_sql_core::error::UnsupportedOperation;

    #[test]
    fn test_driver_error_records_location() {
        let err = Error::driver("describe table", "connection reset");
        let Error::Driver { location, .. } = &err else {
            panic!("expected driver error");
        };
        assert!(location.file().ends_with("error.rs"));
        let message = err.to_string();
        assert!(message.starts_with("describe table failed at "));
        assert!(message.ends_with(": connection reset"));
        assert_eq!(err.dialect_kind(), None);
    }

    #[test]
    fn test_classification() {
        let err = Error::from(DialectError::Unsupported(UnsupportedOperation::RenameTable));
        assert!(err.is_unsupported());
        assert_eq!(err.to_string(), "RenameTable is not supported by ydb");

        let err = Error::from(DialectError::IndexNotFound("idx".into()));
        assert!(err.is_not_found());
        assert!(!err.is_unsupported());
    }

    #[test]
    fn test_partial_rename_message() {
        let err = Error::PartialRename {
            table: "/local/t".into(),
            old: "idx_a".into(),
            new: "idx_b".into(),
            source: Box::new(Error::driver("drop index", "timeout")),
        };
        let message = err.to_string();
        assert!(message.contains("both indexes now exist"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
