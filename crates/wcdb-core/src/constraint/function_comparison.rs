//! Comparisons over a function of the column value (`LENGTH(col) < 64`).

use std::fmt;

use bytes::{Buf, BufMut};
use tracing::warn;
use wcdb_proto::{io, MetadataSerializer, Version};

use super::Operator;
use crate::error::{ConstraintError, DecodeError, DefinitionError};
use crate::schema::{ColumnIdentifier, ColumnMetadata, ColumnType, ScalarValue};

/// Functions that map a column value to an integer for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonFunction {
    /// Number of characters of a string value.
    Length,
    /// Number of bytes of a string or blob value.
    OctetLength,
}

/// Registered comparison functions. Append-only.
const COMPARISON_FUNCTIONS: &[ComparisonFunction] =
    &[ComparisonFunction::Length, ComparisonFunction::OctetLength];

impl ComparisonFunction {
    /// Resolve a function by name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self, DefinitionError> {
        let upper = name.to_ascii_uppercase();
        COMPARISON_FUNCTIONS
            .iter()
            .copied()
            .find(|f| f.name() == upper)
            .ok_or_else(|| DefinitionError::UnrecognizedFunction(name.to_string()))
    }

    /// Registered name.
    pub fn name(&self) -> &'static str {
        match self {
            ComparisonFunction::Length => "LENGTH",
            ComparisonFunction::OctetLength => "OCTET_LENGTH",
        }
    }

    /// Check the function accepts values of `column_type`.
    pub fn supports(&self, column_type: &ColumnType) -> bool {
        match self {
            ComparisonFunction::Length => column_type.is_string(),
            ComparisonFunction::OctetLength => {
                column_type.is_string() || *column_type == ColumnType::Blob
            }
        }
    }

    fn apply(&self, value: &ScalarValue<'_>) -> Option<i64> {
        let len = match (self, value) {
            (ComparisonFunction::Length, ScalarValue::Text(text)) => text.chars().count(),
            (ComparisonFunction::OctetLength, ScalarValue::Text(text)) => text.len(),
            (ComparisonFunction::OctetLength, ScalarValue::Bytes(bytes)) => bytes.len(),
            _ => return None,
        };
        i64::try_from(len).ok()
    }
}

/// Parsed, not yet prepared function comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFunctionConstraint {
    function: ComparisonFunction,
    column: ColumnIdentifier,
    operator: Operator,
    term: String,
}

impl RawFunctionConstraint {
    /// Resolve `function_name` and capture the comparison.
    pub fn new(
        function_name: &str,
        column: ColumnIdentifier,
        operator: Operator,
        term: impl Into<String>,
    ) -> Result<Self, DefinitionError> {
        Ok(Self {
            function: ComparisonFunction::from_name(function_name)?,
            column,
            operator,
            term: term.into(),
        })
    }

    /// Build the evaluation-ready constraint.
    pub fn prepare(self) -> FunctionColumnConstraint {
        FunctionColumnConstraint {
            function: self.function,
            column: self.column,
            operator: self.operator,
            term: self.term,
        }
    }
}

/// Compares a function of the column value against an integer literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionColumnConstraint {
    function: ComparisonFunction,
    column: ColumnIdentifier,
    operator: Operator,
    term: String,
}

impl FunctionColumnConstraint {
    /// Applied function.
    pub fn function(&self) -> ComparisonFunction {
        self.function
    }

    /// Argument column.
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
        let term: i64 = self
            .term
            .trim()
            .parse()
            .map_err(|_| ConstraintError::NonNumericTerm {
                column: self.column.clone(),
                term: self.term.clone(),
            })?;

        let decoded = value_type
            .decode(value)
            .map_err(|source| ConstraintError::MalformedValue {
                column: self.column.clone(),
                source,
            })?;

        match self.function.apply(&decoded) {
            Some(actual) if self.operator.is_satisfied_by(actual.cmp(&term)) => Ok(()),
            _ => Err(ConstraintError::Unsatisfied {
                column: self.column.clone(),
                expected: format!(
                    "{}({}) {} {}",
                    self.function.name(),
                    self.column,
                    self.operator,
                    self.term
                ),
            }),
        }
    }

    pub(crate) fn validate(&self, column: &ColumnMetadata) -> Result<(), DefinitionError> {
        let name = self.function.name();
        if column.name != self.column {
            return Err(DefinitionError::ParameterMismatch {
                function: name,
                column: column.name.clone(),
            });
        }
        if !self.function.supports(&column.column_type) {
            return Err(DefinitionError::UnsupportedType {
                function: name,
                column: column.name.clone(),
                column_type: column.column_type.cql_name(),
            });
        }
        if self.term.trim().parse::<i64>().is_err() {
            return Err(DefinitionError::InvalidTerm {
                function: name,
                term: self.term.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for FunctionColumnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) {} {}",
            self.function.name(),
            self.column.to_cql_string(),
            self.operator,
            self.term
        )
    }
}

/// Payload: column, function name, operator id, term.
pub struct FunctionSerializer;

impl MetadataSerializer<FunctionColumnConstraint> for FunctionSerializer {
    type DecodeError = DecodeError;

    fn serialize<B: BufMut>(
        &self,
        constraint: &FunctionColumnConstraint,
        out: &mut B,
        _version: Version,
    ) -> Result<(), wcdb_proto::Error> {
        io::write_utf(out, &constraint.column.to_cql_string())?;
        io::write_utf(out, constraint.function.name())?;
        constraint.operator.write_to(out);
        io::write_utf(out, &constraint.term)
    }

    fn deserialize<B: Buf>(
        &self,
        input: &mut B,
        _version: Version,
    ) -> Result<FunctionColumnConstraint, DecodeError> {
        let column = ColumnIdentifier::from_cql(&io::read_utf(input)?);
        let function_name = io::read_utf(input)?;
        let operator = Operator::read_from(input)?;
        let term = io::read_utf(input)?;

        let raw = RawFunctionConstraint::new(&function_name, column, operator, term).map_err(
            |err| {
                warn!(function = %function_name, "unknown comparison function in schema metadata");
                DecodeError::UnknownFunction(err)
            },
        )?;
        Ok(raw.prepare())
    }

    fn serialized_size(&self, constraint: &FunctionColumnConstraint, _version: Version) -> usize {
        io::sizeof_utf(&constraint.column.to_cql_string())
            + io::sizeof_utf(constraint.function.name())
            + Operator::serialized_size()
            + io::sizeof_utf(&constraint.term)
    }
}
