//! Write-path constraint enforcement for a table.

use tracing::trace;

use crate::config::ConstraintConfig;
use crate::error::ConstraintError;
use crate::schema::{ColumnIdentifier, ColumnMetadata, TableMetadata};

/// Checks row writes against the constraints of one table definition.
///
/// Values are the serialized column values of the statement; an empty buffer
/// is an explicit null. Columns the table does not define are left to the
/// statement layer and ignored here.
pub struct ConstraintEnforcer<'a> {
    table: &'a TableMetadata,
    config: &'a ConstraintConfig,
}

impl<'a> ConstraintEnforcer<'a> {
    /// Create an enforcer for `table`.
    pub fn new(table: &'a TableMetadata, config: &'a ConstraintConfig) -> Self {
        Self { table, config }
    }

    /// Check an insert.
    ///
    /// Every non-key column declared `NOT_NULL` must be present, then every
    /// present constrained column is evaluated.
    pub fn check_insert(
        &self,
        values: &[(ColumnIdentifier, &[u8])],
    ) -> Result<(), ConstraintError> {
        for column in &self.table.columns {
            if column.is_primary_key_column() || !column.constraints.has_not_null() {
                continue;
            }
            if !values.iter().any(|(name, _)| *name == column.name) {
                return Err(ConstraintError::MissingColumn {
                    column: column.name.clone(),
                });
            }
        }
        self.evaluate_all(values)
    }

    /// Check an update. Only the assigned columns are evaluated.
    pub fn check_update(
        &self,
        values: &[(ColumnIdentifier, &[u8])],
    ) -> Result<(), ConstraintError> {
        self.evaluate_all(values)
    }

    /// Check the deletion of a column value.
    pub fn check_column_deletion(&self, column: &ColumnIdentifier) -> Result<(), ConstraintError> {
        match self.table.get_column(column) {
            Some(metadata) if metadata.constraints.has_not_null() => {
                Err(ConstraintError::NullDeletion {
                    column: metadata.name.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn evaluate_all(&self, values: &[(ColumnIdentifier, &[u8])]) -> Result<(), ConstraintError> {
        if !self.config.enforce_on_write {
            return Ok(());
        }
        for (name, value) in values {
            if let Some(column) = self.table.get_column(name) {
                Self::evaluate_column(column, value)?;
            }
        }
        Ok(())
    }

    fn evaluate_column(column: &ColumnMetadata, value: &[u8]) -> Result<(), ConstraintError> {
        if column.is_primary_key_column() || column.constraints.is_empty() {
            return Ok(());
        }
        trace!(column = %column.name, len = value.len(), "evaluating column constraints");
        column
            .constraints
            .iter()
            .try_for_each(|constraint| constraint.evaluate(&column.column_type, value))
    }
}
