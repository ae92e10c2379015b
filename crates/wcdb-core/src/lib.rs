//! WCDB Core - column value constraints for the wide-column schema layer.
//!
//! This crate provides the schema catalog types a table definition is made
//! of and the constraint subsystem attached to them: parsing `CHECK`
//! clauses, validating them against their columns, evaluating them on the
//! write path, and persisting them in table snapshots.

pub mod config;
pub mod constraint;
pub mod error;
pub mod schema;

pub use config::ConstraintConfig;
pub use constraint::{
    parse_constraints, ColumnConstraint, ColumnConstraints, ConstraintEnforcer, ConstraintKind,
    Operator, RawConstraint,
};
pub use error::{ConstraintError, DecodeError, DefinitionError, Error, Result};
pub use schema::{
    ColumnIdentifier, ColumnKind, ColumnMetadata, ColumnType, ScalarValue, TableMetadata,
    TableSnapshot,
};
