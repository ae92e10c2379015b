//! Table definitions and their persisted snapshots.

use std::fmt::Write as _;

use rkyv::{Archive, Deserialize, Serialize};
use tracing::{debug, instrument};
use wcdb_proto::Version;

use super::{ColumnIdentifier, ColumnKind, ColumnMetadata, ColumnType};
use crate::config::ConstraintConfig;
use crate::constraint::{codec, parse_constraints, ColumnConstraints};
use crate::error::{DefinitionError, Error, Result};

/// A table definition.
///
/// Schema changes build a new value; existing definitions are never mutated
/// by the constraint subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    /// Keyspace name.
    pub keyspace: String,
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    /// Create an empty table definition.
    pub fn new(keyspace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column.
    ///
    /// Key columns get the next position of their key component.
    pub fn with_column(mut self, mut column: ColumnMetadata) -> Self {
        if column.is_primary_key_column() {
            let position = self.columns.iter().filter(|c| c.kind == column.kind).count();
            column.position = position as u32;
        }
        self.columns.push(column);
        self
    }

    /// Attach the constraints of a `CHECK` clause to a column.
    pub fn with_check(
        mut self,
        column: &str,
        clause: &str,
    ) -> std::result::Result<Self, DefinitionError> {
        let id = ColumnIdentifier::from_cql(column);
        let table = self.name.clone();
        let target = self
            .columns
            .iter_mut()
            .find(|c| c.name == id)
            .ok_or(DefinitionError::UnknownColumn { column: id.clone(), table })?;

        let parsed = parse_constraints(&id, clause)?.prepare();
        let mut merged: Vec<_> = target.constraints.iter().cloned().collect();
        merged.extend(parsed.iter().cloned());
        target.constraints = ColumnConstraints::new(id, merged);
        Ok(self)
    }

    /// Look up a column.
    pub fn get_column(&self, name: &ColumnIdentifier) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| &c.name == name)
    }

    /// Partition key columns in key order.
    pub fn partition_key_columns(&self) -> Vec<&ColumnMetadata> {
        self.key_columns(ColumnKind::PartitionKey)
    }

    /// Clustering columns in key order.
    pub fn clustering_columns(&self) -> Vec<&ColumnMetadata> {
        self.key_columns(ColumnKind::Clustering)
    }

    fn key_columns(&self, kind: ColumnKind) -> Vec<&ColumnMetadata> {
        let mut columns: Vec<_> = self.columns.iter().filter(|c| c.kind == kind).collect();
        columns.sort_by_key(|c| c.position);
        columns
    }

    /// Validate the constraints of every column.
    ///
    /// The first failure aborts the whole definition.
    #[instrument(skip(self, config), fields(keyspace = %self.keyspace, table = %self.name))]
    pub fn validate_constraints(
        &self,
        config: &ConstraintConfig,
    ) -> std::result::Result<(), DefinitionError> {
        for column in &self.columns {
            if column.constraints.is_empty() {
                continue;
            }
            debug!(column = %column.name, constraints = %column.constraints, "validating column constraints");
            for constraint in &column.constraints {
                constraint.validate(column)?;
                constraint.check_term_lengths(config.max_term_length)?;
            }
        }
        Ok(())
    }

    /// Render the definition as a `CREATE TABLE` statement.
    pub fn to_cql(&self) -> String {
        let mut cql = format!("CREATE TABLE {}.{} (\n", self.keyspace, self.name);
        for column in &self.columns {
            let _ = write!(cql, "    {} {}", column.name.to_cql_string(), column.column_type);
            if column.is_static() {
                cql.push_str(" static");
            }
            if !column.constraints.is_empty() {
                let _ = write!(cql, " CHECK {}", column.constraints);
            }
            cql.push_str(",\n");
        }

        let partition: Vec<_> = self
            .partition_key_columns()
            .iter()
            .map(|c| c.name.to_cql_string())
            .collect();
        let partition = match partition.as_slice() {
            [single] => single.clone(),
            many => format!("({})", many.join(", ")),
        };
        let mut key = vec![partition];
        key.extend(self.clustering_columns().iter().map(|c| c.name.to_cql_string()));
        let _ = write!(cql, "    PRIMARY KEY ({})\n)", key.join(", "));
        cql
    }

    /// Build the persisted form, encoding constraints with `version`.
    pub fn to_snapshot(&self, version: Version) -> Result<TableSnapshot> {
        let columns = self
            .columns
            .iter()
            .map(|column| -> Result<ColumnSnapshot> {
                let constraints = column.constraints.as_slice();
                let mut encoded =
                    Vec::with_capacity(codec::serialized_size_all(constraints, version));
                codec::serialize_all(constraints, &mut encoded, version)?;
                Ok(ColumnSnapshot {
                    name: column.name.to_cql_string(),
                    column_type: column.column_type,
                    kind: column.kind,
                    position: column.position,
                    constraints: encoded,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TableSnapshot {
            version: version.as_u32(),
            keyspace: self.keyspace.clone(),
            name: self.name.clone(),
            columns,
        })
    }

    /// Rebuild a definition from its persisted form.
    pub fn from_snapshot(snapshot: &TableSnapshot) -> Result<Self> {
        let version = Version::from_u32(snapshot.version)?;
        let mut table = TableMetadata::new(snapshot.keyspace.clone(), snapshot.name.clone());
        for column in &snapshot.columns {
            let name = ColumnIdentifier::from_cql(&column.name);
            let mut input = column.constraints.as_slice();
            let constraints = codec::deserialize_all(&mut input, version)?;
            table.columns.push(ColumnMetadata {
                constraints: ColumnConstraints::new(name.clone(), constraints),
                name,
                column_type: column.column_type,
                kind: column.kind,
                position: column.position,
            });
        }
        Ok(table)
    }

    /// Serialize the definition for the schema log.
    pub fn to_snapshot_bytes(&self, version: Version) -> Result<Vec<u8>> {
        self.to_snapshot(version)?.to_bytes()
    }

    /// Validate the definition and serialize it with the configured
    /// metadata version. This is the entry point for committing DDL.
    #[instrument(skip_all, fields(table = %self.name, version = %config.metadata_version))]
    pub fn persist(&self, config: &ConstraintConfig) -> Result<Vec<u8>> {
        self.validate_constraints(config)?;
        let bytes = self.to_snapshot_bytes(config.metadata_version)?;
        debug!(len = bytes.len(), "persisted table definition");
        Ok(bytes)
    }

    /// Deserialize a definition written by [`to_snapshot_bytes`](Self::to_snapshot_bytes).
    pub fn from_snapshot_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_snapshot(&TableSnapshot::from_bytes(bytes)?)
    }
}

/// Persisted form of a table definition.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Metadata version the constraint lists were written with.
    pub version: u32,
    /// Keyspace name.
    pub keyspace: String,
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnSnapshot>,
}

/// Persisted form of a column definition.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    /// Column name as CQL text.
    pub name: String,
    /// Declared type.
    pub column_type: ColumnType,
    /// Role in the table.
    pub kind: ColumnKind,
    /// Key position.
    pub position: u32,
    /// Constraint list in envelope encoding.
    pub constraints: Vec<u8>,
}

impl TableSnapshot {
    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(bytes.len());
        aligned.extend_from_slice(bytes);
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(&aligned)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }
}
