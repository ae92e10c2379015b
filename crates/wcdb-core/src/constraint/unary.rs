//! Unary function constraints (`NOT_NULL(col)`).

use std::fmt;

use bytes::{Buf, BufMut};
use tracing::warn;
use wcdb_proto::{io, MetadataSerializer, Version};

use super::function::{create_constraint_function, ConstraintFunction};
use crate::error::{ConstraintError, DecodeError, DefinitionError};
use crate::schema::{ColumnIdentifier, ColumnMetadata, ColumnType};

/// Parsed, not yet prepared unary function constraint.
///
/// The function name is resolved when the raw form is built, so an unknown
/// name fails while parsing the definition rather than during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUnaryFunctionConstraint {
    function: ConstraintFunction,
    column: ColumnIdentifier,
}

impl RawUnaryFunctionConstraint {
    /// Resolve `function_name` and bind it to its argument column.
    pub fn new(function_name: &str, column: ColumnIdentifier) -> Result<Self, DefinitionError> {
        let function = create_constraint_function(function_name, column.clone())?;
        Ok(Self { function, column })
    }

    /// Build the evaluation-ready constraint.
    pub fn prepare(self) -> UnaryFunctionColumnConstraint {
        UnaryFunctionColumnConstraint {
            function: self.function,
            column: self.column,
        }
    }
}

/// A registered constraint function applied to a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnaryFunctionColumnConstraint {
    function: ConstraintFunction,
    column: ColumnIdentifier,
}

impl UnaryFunctionColumnConstraint {
    /// Function name.
    pub fn name(&self) -> &'static str {
        self.function.name()
    }

    /// Wrapped function.
    pub fn function(&self) -> &ConstraintFunction {
        &self.function
    }

    /// Argument column of the function.
    pub fn column(&self) -> &ColumnIdentifier {
        &self.column
    }

    pub(crate) fn evaluate_non_null(
        &self,
        value_type: &ColumnType,
        value: &[u8],
    ) -> Result<(), ConstraintError> {
        self.function.evaluate(value_type, value)
    }

    pub(crate) fn validate(&self, column: &ColumnMetadata) -> Result<(), DefinitionError> {
        self.validate_args(column)?;
        self.function.validate(column)
    }

    fn validate_args(&self, column: &ColumnMetadata) -> Result<(), DefinitionError> {
        if column.name != self.column {
            return Err(DefinitionError::ParameterMismatch {
                function: self.name(),
                column: column.name.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for UnaryFunctionColumnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.column.to_cql_string())
    }
}

/// Payload: column, function name.
pub struct UnaryFunctionSerializer;

impl MetadataSerializer<UnaryFunctionColumnConstraint> for UnaryFunctionSerializer {
    type DecodeError = DecodeError;

    fn serialize<B: BufMut>(
        &self,
        constraint: &UnaryFunctionColumnConstraint,
        out: &mut B,
        _version: Version,
    ) -> Result<(), wcdb_proto::Error> {
        io::write_utf(out, &constraint.column.to_cql_string())?;
        io::write_utf(out, constraint.name())
    }

    fn deserialize<B: Buf>(
        &self,
        input: &mut B,
        _version: Version,
    ) -> Result<UnaryFunctionColumnConstraint, DecodeError> {
        let column = ColumnIdentifier::from_cql(&io::read_utf(input)?);
        let function_name = io::read_utf(input)?;

        let raw = RawUnaryFunctionConstraint::new(&function_name, column).map_err(|err| {
            warn!(function = %function_name, "unknown constraint function in schema metadata");
            DecodeError::UnknownFunction(err)
        })?;
        Ok(raw.prepare())
    }

    fn serialized_size(
        &self,
        constraint: &UnaryFunctionColumnConstraint,
        _version: Version,
    ) -> usize {
        io::sizeof_utf(&constraint.column.to_cql_string()) + io::sizeof_utf(constraint.name())
    }
}
