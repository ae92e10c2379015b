//! Scalar comparison constraints (`col > 5`).

use std::fmt;

use bytes::{Buf, BufMut};
use wcdb_proto::{io, MetadataSerializer, Version};

use super::Operator;
use crate::error::{ConstraintError, DecodeError, DefinitionError};
use crate::schema::{ColumnIdentifier, ColumnMetadata, ColumnType};

/// Parsed, not yet prepared scalar constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawScalarConstraint {
    /// Column being compared.
    pub column: ColumnIdentifier,
    /// Relation to the term.
    pub operator: Operator,
    /// Literal term as written.
    pub term: String,
}

impl RawScalarConstraint {
    /// Capture the syntax of a comparison.
    pub fn new(column: ColumnIdentifier, operator: Operator, term: impl Into<String>) -> Self {
        Self {
            column,
            operator,
            term: term.into(),
        }
    }

    /// Build the evaluation-ready constraint.
    pub fn prepare(self) -> ScalarColumnConstraint {
        ScalarColumnConstraint {
            column: self.column,
            operator: self.operator,
            term: self.term,
        }
    }
}

/// Compares the column value against a literal using the column type's
/// ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarColumnConstraint {
    column: ColumnIdentifier,
    operator: Operator,
    term: String,
}

impl ScalarColumnConstraint {
    /// Column the constraint applies to.
    pub fn column(&self) -> &ColumnIdentifier {
        &self.column
    }

    /// Relational operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Literal term.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub(crate) fn evaluate_non_null(
        &self,
        value_type: &ColumnType,
        value: &[u8],
    ) -> Result<(), ConstraintError> {
        let term = value_type
            .parse_literal(&self.term)
            .map_err(|_| ConstraintError::NonNumericTerm {
                column: self.column.clone(),
                term: self.term.clone(),
            })?;

        let actual = value_type
            .decode(value)
            .map_err(|source| ConstraintError::MalformedValue {
                column: self.column.clone(),
                source,
            })?;

        match actual.compare(&term) {
            Some(ordering) if self.operator.is_satisfied_by(ordering) => Ok(()),
            _ => Err(ConstraintError::Unsatisfied {
                column: self.column.clone(),
                expected: format!("{} {} {}", self.column, self.operator, self.term),
            }),
        }
    }

    pub(crate) fn validate(&self, column: &ColumnMetadata) -> Result<(), DefinitionError> {
        if !column.column_type.is_number() {
            return Err(DefinitionError::NotNumeric {
                column: self.column.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ScalarColumnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.column.to_cql_string(),
            self.operator,
            self.term
        )
    }
}

/// Payload: column, operator id, term.
pub struct ScalarSerializer;

impl MetadataSerializer<ScalarColumnConstraint> for ScalarSerializer {
    type DecodeError = DecodeError;

    fn serialize<B: BufMut>(
        &self,
        constraint: &ScalarColumnConstraint,
        out: &mut B,
        _version: Version,
    ) -> Result<(), wcdb_proto::Error> {
        io::write_utf(out, &constraint.column.to_cql_string())?;
        constraint.operator.write_to(out);
        io::write_utf(out, &constraint.term)
    }

    fn deserialize<B: Buf>(
        &self,
        input: &mut B,
        _version: Version,
    ) -> Result<ScalarColumnConstraint, DecodeError> {
        let column = ColumnIdentifier::from_cql(&io::read_utf(input)?);
        let operator = Operator::read_from(input)?;
        let term = io::read_utf(input)?;
        Ok(RawScalarConstraint::new(column, operator, term).prepare())
    }

    fn serialized_size(&self, constraint: &ScalarColumnConstraint, _version: Version) -> usize {
        io::sizeof_utf(&constraint.column.to_cql_string())
            + Operator::serialized_size()
            + io::sizeof_utf(&constraint.term)
    }
}
