//! Error types for YQL translation and planning.

use std::fmt;

/// Migrator and dialect operations YDB cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedOperation {
    AlterColumn,
    MigrateColumn,
    RenameColumn,
    RenameTable,
    HasColumn,
    CreateView,
    DropView,
    CreateConstraint,
    DropConstraint,
    HasConstraint,
    GetIndexes,
    GetTypeAliases,
    TableType,
    SavePoint,
    RollbackTo,
}

impl UnsupportedOperation {
    /// Returns the operation name as used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlterColumn => "AlterColumn",
            Self::MigrateColumn => "MigrateColumn",
            Self::RenameColumn => "RenameColumn",
            Self::RenameTable => "RenameTable",
            Self::HasColumn => "HasColumn",
            Self::CreateView => "CreateView",
            Self::DropView => "DropView",
            Self::CreateConstraint => "CreateConstraint",
            Self::DropConstraint => "DropConstraint",
            Self::HasConstraint => "HasConstraint",
            Self::GetIndexes => "GetIndexes",
            Self::GetTypeAliases => "GetTypeAliases",
            Self::TableType => "TableType",
            Self::SavePoint => "SavePoint",
            Self::RollbackTo => "RollbackTo",
        }
    }
}

impl fmt::Display for UnsupportedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad classification of a [`DialectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// YDB lacks the requested capability.
    Unsupported,
    /// A named index or field does not exist.
    NotFound,
    /// An input could not be translated into YQL.
    Translation,
}

/// Errors produced while mapping types, encoding values, building clauses
/// or planning schema changes.
#[derive(Debug, thiserror::Error)]
pub enum DialectError {
    /// The operation has no YDB counterpart.
    #[error("{0} is not supported by ydb")]
    Unsupported(UnsupportedOperation),

    /// A field declares a constraint YDB cannot enforce.
    #[error("model {model}, field {field}: {constraint}")]
    UnsupportedConstraint {
        /// Model the field belongs to.
        model: String,
        /// Column name of the field.
        field: String,
        /// Human readable description of the rejected constraint.
        constraint: String,
    },

    /// The model declares CHECK or FOREIGN KEY constraints.
    #[error("model {model}: constraints are not supported in ydb (found {count})")]
    ConstraintsNotSupported {
        /// Model name.
        model: String,
        /// Number of declared constraints.
        count: usize,
    },

    /// The field asks for a serialization format that cannot be produced.
    #[error("field {field}: {format} serialization is not supported")]
    UnsupportedSerialization {
        /// Column name of the field.
        field: String,
        /// The requested format.
        format: String,
    },

    /// No index with this name is declared on the model.
    #[error("index '{0}' not found")]
    IndexNotFound(String),

    /// No field with this name is declared on the model.
    #[error("field '{0}' not found")]
    FieldNotFound(String),

    /// The field kind has no YDB column type.
    #[error("unsupported data type '{0}'")]
    UnsupportedDataType(String),

    /// The runtime value has no YDB representation.
    #[error("unsupported value type '{0}'")]
    UnsupportedValue(String),

    /// The predicate kind cannot be translated.
    #[error("unrecognized expression: {0}")]
    UnrecognizedExpression(String),

    /// Values bound to one parameter disagree on their type.
    #[error("column {column}: type mismatch, expected {expected}, found {found}")]
    TypeMismatch {
        /// Column the values belong to.
        column: String,
        /// Type established by earlier values.
        expected: String,
        /// Type of the offending value.
        found: String,
    },

    /// A VALUES row whose length differs from the column list.
    #[error("values row {row}: expected {expected} values, found {found}")]
    RowArity {
        /// Zero-based row index.
        row: usize,
        /// Number of columns.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },

    /// A VALUES clause without columns or rows.
    #[error("empty values clause for table {0}")]
    EmptyValues(String),

    /// An IN predicate with an empty list.
    #[error("empty IN list for column {0}")]
    EmptyInList(String),

    /// The model has no primary key, which YDB tables require.
    #[error("model {0} has no primary key")]
    MissingPrimaryKey(String),

    /// JSON serialization of a field value failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DialectError {
    /// Returns the broad class of the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unsupported(_)
            | Self::UnsupportedConstraint { .. }
            | Self::ConstraintsNotSupported { .. }
            | Self::UnsupportedSerialization { .. } => ErrorKind::Unsupported,
            Self::IndexNotFound(_) | Self::FieldNotFound(_) => ErrorKind::NotFound,
            Self::UnsupportedDataType(_)
            | Self::UnsupportedValue(_)
            | Self::UnrecognizedExpression(_)
            | Self::TypeMismatch { .. }
            | Self::RowArity { .. }
            | Self::EmptyValues(_)
            | Self::EmptyInList(_)
            | Self::MissingPrimaryKey(_)
            | Self::Serialization(_) => ErrorKind::Translation,
        }
    }

    /// Returns true for capability gaps.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unsupported)
    }

    /// Returns true when a named index or field was not found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound)
    }
}

/// Result type for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = DialectError::Unsupported(UnsupportedOperation::RenameColumn);
        assert_eq!(err.to_string(), "RenameColumn is not supported by ydb");
        assert!(err.is_unsupported());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(
            DialectError::IndexNotFound("idx".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DialectError::UnsupportedValue("i128".into()).kind(),
            ErrorKind::Translation
        );
        assert_eq!(
            DialectError::UnsupportedConstraint {
                model: "User".into(),
                field: "name".into(),
                constraint: "UNIQUE is not supported in ydb".into(),
            }
            .kind(),
            ErrorKind::Unsupported
        );
    }
}
