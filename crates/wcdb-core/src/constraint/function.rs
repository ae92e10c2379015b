//! Named constraint functions and their registry.

use crate::error::{ConstraintError, DefinitionError};
use crate::schema::{ColumnIdentifier, ColumnMetadata, ColumnType};

/// Builds a function instance bound to a column.
type FunctionConstructor = fn(ColumnIdentifier) -> ConstraintFunction;

/// Registered constraint functions, keyed by upper-case name.
///
/// Append-only: names persisted in schema metadata must keep resolving.
const FUNCTIONS: &[(&str, FunctionConstructor)] =
    &[(NotNullConstraint::FUNCTION_NAME, NotNullConstraint::create)];

/// Build the constraint function registered under `name`.
///
/// The lookup is case-insensitive.
pub fn create_constraint_function(
    name: &str,
    column: ColumnIdentifier,
) -> Result<ConstraintFunction, DefinitionError> {
    let upper = name.to_ascii_uppercase();
    FUNCTIONS
        .iter()
        .find(|(registered, _)| *registered == upper)
        .map(|(_, create)| create(column))
        .ok_or_else(|| DefinitionError::UnrecognizedFunction(name.to_string()))
}

/// Names of all registered constraint functions.
pub fn function_names() -> impl Iterator<Item = &'static str> {
    FUNCTIONS.iter().map(|(name, _)| *name)
}

/// A stateless constraint function bound to a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintFunction {
    /// Forbids null values.
    NotNull(NotNullConstraint),
}

impl ConstraintFunction {
    /// Registered name of the function.
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintFunction::NotNull(_) => NotNullConstraint::FUNCTION_NAME,
        }
    }

    /// Column the function is bound to.
    pub fn column(&self) -> &ColumnIdentifier {
        match self {
            ConstraintFunction::NotNull(f) => &f.column,
        }
    }

    /// Evaluate the function against a non-null value.
    pub fn evaluate(&self, value_type: &ColumnType, value: &[u8]) -> Result<(), ConstraintError> {
        match self {
            ConstraintFunction::NotNull(f) => f.evaluate(value_type, value),
        }
    }

    /// Check the function can be declared on `column`.
    pub fn validate(&self, column: &ColumnMetadata) -> Result<(), DefinitionError> {
        match self {
            ConstraintFunction::NotNull(f) => f.validate(column),
        }
    }

    /// Check whether this function forbids null values.
    pub fn is_not_null(&self) -> bool {
        matches!(self, ConstraintFunction::NotNull(_))
    }
}

/// `NOT_NULL(col)`: the column may never hold null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotNullConstraint {
    column: ColumnIdentifier,
}

impl NotNullConstraint {
    /// Registered name.
    pub const FUNCTION_NAME: &'static str = "NOT_NULL";

    /// Bind the function to a column.
    pub fn new(column: ColumnIdentifier) -> Self {
        Self { column }
    }

    fn create(column: ColumnIdentifier) -> ConstraintFunction {
        ConstraintFunction::NotNull(Self::new(column))
    }

    /// Always succeeds: null values are rejected before any function runs.
    pub fn evaluate(&self, _value_type: &ColumnType, _value: &[u8]) -> Result<(), ConstraintError> {
        Ok(())
    }

    /// Reject declarations on primary-key columns.
    pub fn validate(&self, column: &ColumnMetadata) -> Result<(), DefinitionError> {
        if column.is_primary_key_column() {
            let role = if column.is_partition_key() {
                "partition"
            } else {
                "clustering"
            };
            return Err(DefinitionError::KeyColumn {
                function: Self::FUNCTION_NAME,
                role,
                column: column.name.clone(),
            });
        }
        Ok(())
    }
}
