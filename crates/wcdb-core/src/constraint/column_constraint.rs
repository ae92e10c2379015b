//! The constraint sum type.

use std::fmt;

use super::composed::{ColumnConstraints, RawColumnConstraints};
use super::function_comparison::{FunctionColumnConstraint, RawFunctionConstraint};
use super::scalar::{RawScalarConstraint, ScalarColumnConstraint};
use super::unary::{RawUnaryFunctionConstraint, UnaryFunctionColumnConstraint};
use super::ConstraintKind;
use crate::error::{ConstraintError, DefinitionError};
use crate::schema::{ColumnIdentifier, ColumnMetadata, ColumnType};

/// A prepared column constraint.
///
/// Values are immutable once built and can be evaluated concurrently from any
/// number of writer threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnConstraint {
    /// All children must hold.
    Composed(ColumnConstraints),
    /// `FN(col) <op> term`.
    Function(FunctionColumnConstraint),
    /// `col <op> term`.
    Scalar(ScalarColumnConstraint),
    /// `FN(col)`.
    UnaryFunction(UnaryFunctionColumnConstraint),
}

impl ColumnConstraint {
    /// Kind tag of this variant.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            ColumnConstraint::Composed(_) => ConstraintKind::Composed,
            ColumnConstraint::Function(_) => ConstraintKind::Function,
            ColumnConstraint::Scalar(_) => ConstraintKind::Scalar,
            ColumnConstraint::UnaryFunction(_) => ConstraintKind::UnaryFunction,
        }
    }

    /// Column the constraint applies to.
    pub fn column(&self) -> &ColumnIdentifier {
        match self {
            ColumnConstraint::Composed(c) => c.column(),
            ColumnConstraint::Function(c) => c.column(),
            ColumnConstraint::Scalar(c) => c.column(),
            ColumnConstraint::UnaryFunction(c) => c.column(),
        }
    }

    /// Evaluate the constraint against a value about to be written.
    ///
    /// A zero-length buffer is CQL null and is rejected here for every
    /// variant, before any variant-specific check runs.
    pub fn evaluate(&self, value_type: &ColumnType, value: &[u8]) -> Result<(), ConstraintError> {
        if value.is_empty() {
            return Err(ConstraintError::NullValue {
                column: self.column().clone(),
            });
        }

        match self {
            ColumnConstraint::Composed(c) => c.evaluate_non_null(value_type, value),
            ColumnConstraint::Function(c) => c.evaluate_non_null(value_type, value),
            ColumnConstraint::Scalar(c) => c.evaluate_non_null(value_type, value),
            ColumnConstraint::UnaryFunction(c) => c.evaluate_non_null(value_type, value),
        }
    }

    /// Check the constraint is consistent with the column it is declared on.
    pub fn validate(&self, column: &ColumnMetadata) -> Result<(), DefinitionError> {
        match self {
            ColumnConstraint::Composed(c) => c.validate(column),
            ColumnConstraint::Function(c) => c.validate(column),
            ColumnConstraint::Scalar(c) => c.validate(column),
            ColumnConstraint::UnaryFunction(c) => c.validate(column),
        }
    }

    /// Check every literal term is at most `max` characters long.
    pub fn check_term_lengths(&self, max: usize) -> Result<(), DefinitionError> {
        let term = match self {
            ColumnConstraint::Composed(c) => {
                return c.iter().try_for_each(|child| child.check_term_lengths(max));
            }
            ColumnConstraint::Function(c) => c.term(),
            ColumnConstraint::Scalar(c) => c.term(),
            ColumnConstraint::UnaryFunction(_) => return Ok(()),
        };

        if term.chars().count() > max {
            return Err(DefinitionError::TermTooLong {
                column: self.column().clone(),
                max,
            });
        }
        Ok(())
    }

    /// Check whether this constraint forbids null values outright.
    pub fn requires_value(&self) -> bool {
        match self {
            ColumnConstraint::Composed(c) => c.iter().any(ColumnConstraint::requires_value),
            ColumnConstraint::UnaryFunction(c) => c.function().is_not_null(),
            ColumnConstraint::Function(_) | ColumnConstraint::Scalar(_) => false,
        }
    }
}

impl fmt::Display for ColumnConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnConstraint::Composed(c) => fmt::Display::fmt(c, f),
            ColumnConstraint::Function(c) => fmt::Display::fmt(c, f),
            ColumnConstraint::Scalar(c) => fmt::Display::fmt(c, f),
            ColumnConstraint::UnaryFunction(c) => fmt::Display::fmt(c, f),
        }
    }
}

impl From<ColumnConstraints> for ColumnConstraint {
    fn from(c: ColumnConstraints) -> Self {
        ColumnConstraint::Composed(c)
    }
}

impl From<FunctionColumnConstraint> for ColumnConstraint {
    fn from(c: FunctionColumnConstraint) -> Self {
        ColumnConstraint::Function(c)
    }
}

impl From<ScalarColumnConstraint> for ColumnConstraint {
    fn from(c: ScalarColumnConstraint) -> Self {
        ColumnConstraint::Scalar(c)
    }
}

impl From<UnaryFunctionColumnConstraint> for ColumnConstraint {
    fn from(c: UnaryFunctionColumnConstraint) -> Self {
        ColumnConstraint::UnaryFunction(c)
    }
}

/// A constraint as parsed from a definition, before preparation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawConstraint {
    /// Raw composed constraint.
    Composed(RawColumnConstraints),
    /// Raw function comparison.
    Function(RawFunctionConstraint),
    /// Raw scalar comparison.
    Scalar(RawScalarConstraint),
    /// Raw unary function.
    UnaryFunction(RawUnaryFunctionConstraint),
}

impl RawConstraint {
    /// Build the evaluation-ready constraint.
    pub fn prepare(self) -> ColumnConstraint {
        match self {
            RawConstraint::Composed(raw) => raw.prepare().into(),
            RawConstraint::Function(raw) => raw.prepare().into(),
            RawConstraint::Scalar(raw) => raw.prepare().into(),
            RawConstraint::UnaryFunction(raw) => raw.prepare().into(),
        }
    }
}
