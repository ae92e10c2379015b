//! Core error types.

use thiserror::Error;

use crate::schema::{ColumnIdentifier, MarshalError};

/// Core errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A written value violated a column constraint.
    #[error(transparent)]
    ConstraintViolation(#[from] ConstraintError),

    /// A constraint was declared inconsistently with its column.
    #[error(transparent)]
    InvalidDefinition(#[from] DefinitionError),

    /// Persisted constraint metadata could not be read back.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] wcdb_proto::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Write-time constraint violations.
///
/// Each violation aborts only the write that produced it; the message is
/// surfaced to the client unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstraintError {
    /// The value was the CQL null sentinel.
    #[error("Column value does not satisfy value constraint for column '{column}' as it is null.")]
    NullValue {
        /// Constrained column.
        column: ColumnIdentifier,
    },

    /// The value did not satisfy the constraint's relation.
    #[error("Column value does not satisfy value constraint for column '{column}'. It should be {expected}")]
    Unsatisfied {
        /// Constrained column.
        column: ColumnIdentifier,
        /// The unmet requirement, e.g. `col > 5`.
        expected: String,
    },

    /// The constraint term could not be parsed as the column's type.
    #[error("{column} and {term} need to be numbers.")]
    NonNumericTerm {
        /// Constrained column.
        column: ColumnIdentifier,
        /// Literal term of the constraint.
        term: String,
    },

    /// The value bytes are not a valid value of the declared type.
    #[error("Column value for column '{column}' is malformed: {source}")]
    MalformedValue {
        /// Constrained column.
        column: ColumnIdentifier,
        /// Decoding failure.
        source: MarshalError,
    },

    /// A column that must not be null was left out of an insert.
    #[error("Column '{column}' has to be specified as part of this query.")]
    MissingColumn {
        /// Omitted column.
        column: ColumnIdentifier,
    },

    /// A column that must not be null was deleted.
    #[error("Column '{column}' can not be set to null.")]
    NullDeletion {
        /// Deleted column.
        column: ColumnIdentifier,
    },
}

/// Schema-definition errors for constraints.
///
/// Any of these aborts the whole definition statement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// A comparison was declared on a non-numeric column.
    #[error("Column '{column}' is not a number type.")]
    NotNumeric {
        /// Target column.
        column: ColumnIdentifier,
    },

    /// A function that is forbidden on key columns was declared on one.
    #[error("{function} constraint can not be specified on a {role} key column '{column}'")]
    KeyColumn {
        /// Function name.
        function: &'static str,
        /// `partition` or `clustering`.
        role: &'static str,
        /// Target column.
        column: ColumnIdentifier,
    },

    /// A function's argument does not name the declaring column.
    #[error("Parameter of {function} constraint should be the column name ({column})")]
    ParameterMismatch {
        /// Function name.
        function: &'static str,
        /// Declaring column.
        column: ColumnIdentifier,
    },

    /// The named constraint function does not exist.
    #[error("Unrecognized constraint function: {0}")]
    UnrecognizedFunction(String),

    /// A function cannot be applied to the column's type.
    #[error("{function} can not be used on column '{column}' of type {column_type}")]
    UnsupportedType {
        /// Function name.
        function: &'static str,
        /// Target column.
        column: ColumnIdentifier,
        /// CQL name of the column's type.
        column_type: &'static str,
    },

    /// A function's term is not an integer.
    #[error("{function} constraint term '{term}' is not a valid integer")]
    InvalidTerm {
        /// Function name.
        function: &'static str,
        /// Offending term.
        term: String,
    },

    /// A term exceeds the configured maximum length.
    #[error("Constraint term for column '{column}' exceeds {max} characters")]
    TermTooLong {
        /// Target column.
        column: ColumnIdentifier,
        /// Configured limit.
        max: usize,
    },

    /// The constraint targets a column the table does not define.
    #[error("Undefined column name {column} in table {table}")]
    UnknownColumn {
        /// Referenced column.
        column: ColumnIdentifier,
        /// Table name.
        table: String,
    },

    /// The constraint clause could not be parsed.
    #[error("Invalid constraint syntax: {0}")]
    Syntax(String),
}

/// Errors reading persisted constraint metadata.
///
/// These are fatal for loading the schema version that contains them:
/// dropping an unreadable constraint would silently remove a data integrity
/// guarantee.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecodeError {
    /// Primitive read failure (truncation, bad UTF-8, unknown version).
    #[error(transparent)]
    Io(#[from] wcdb_proto::Error),

    /// The envelope names a kind tag this node does not know.
    #[error("unknown constraint kind tag: {0}")]
    UnknownKind(i32),

    /// The payload names an operator id this node does not know.
    #[error("unknown relational operator id: {0}")]
    UnknownOperator(i32),

    /// The payload names a constraint function this node does not know.
    #[error("cannot deserialize constraint: {0}")]
    UnknownFunction(#[source] DefinitionError),

    /// A list count was negative.
    #[error("invalid constraint count: {0}")]
    NegativeCount(i32),

    /// Composed constraints were nested deeper than the decoder allows.
    #[error("composed constraints nested {0} levels deep")]
    NestingTooDeep(usize),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_messages() {
        let col = ColumnIdentifier::from_cql("col1");
        assert_eq!(
            ConstraintError::NullValue {
                column: col.clone()
            }
            .to_string(),
            "Column value does not satisfy value constraint for column 'col1' as it is null."
        );
        assert_eq!(
            ConstraintError::MissingColumn {
                column: col.clone()
            }
            .to_string(),
            "Column 'col1' has to be specified as part of this query."
        );
        assert_eq!(
            ConstraintError::NullDeletion { column: col }.to_string(),
            "Column 'col1' can not be set to null."
        );
    }

    #[test]
    fn test_definition_messages() {
        let err = DefinitionError::KeyColumn {
            function: "NOT_NULL",
            role: "partition",
            column: ColumnIdentifier::from_cql("pk"),
        };
        assert_eq!(
            err.to_string(),
            "NOT_NULL constraint can not be specified on a partition key column 'pk'"
        );

        let err = DefinitionError::UnrecognizedFunction("FOO".into());
        assert_eq!(err.to_string(), "Unrecognized constraint function: FOO");
    }

    #[test]
    fn test_error_conversions() {
        let err: Error = ConstraintError::NullValue {
            column: ColumnIdentifier::from_cql("v"),
        }
        .into();
        assert!(matches!(err, Error::ConstraintViolation(_)));
        assert!(err.to_string().ends_with("as it is null."));

        let err: Error = DecodeError::UnknownKind(42).into();
        assert_eq!(err.to_string(), "decode error: unknown constraint kind tag: 42");
    }
}
