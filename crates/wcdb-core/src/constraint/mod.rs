//! Column value constraints.
//!
//! Constraints are declared on a column in a table definition, validated
//! against the column when the definition is applied, evaluated against
//! every value written to the column, and persisted in schema metadata with
//! the envelope encoding in [`codec`].
//!
//! Definitions are built in two steps: the parser produces raw constraints,
//! and [`RawConstraint::prepare`] turns them into the immutable
//! [`ColumnConstraint`] values used for validation and evaluation.

pub mod codec;
mod column_constraint;
mod composed;
mod enforcement;
mod function;
mod function_comparison;
mod kind;
mod operator;
mod parser;
mod scalar;
mod unary;

pub use codec::ConstraintSerializer;
pub use column_constraint::{ColumnConstraint, RawConstraint};
pub use composed::{ColumnConstraints, ComposedSerializer, RawColumnConstraints};
pub use enforcement::ConstraintEnforcer;
pub use function::{
    create_constraint_function, function_names, ConstraintFunction, NotNullConstraint,
};
pub use function_comparison::{
    ComparisonFunction, FunctionColumnConstraint, FunctionSerializer, RawFunctionConstraint,
};
pub use kind::ConstraintKind;
pub use operator::Operator;
pub use parser::parse_constraints;
pub use scalar::{RawScalarConstraint, ScalarColumnConstraint, ScalarSerializer};
pub use unary::{
    RawUnaryFunctionConstraint, UnaryFunctionColumnConstraint, UnaryFunctionSerializer,
};
