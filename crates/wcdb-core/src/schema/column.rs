//! Column definitions.

use rkyv::{Archive, Deserialize, Serialize};

use super::{ColumnIdentifier, ColumnType};
use crate::constraint::ColumnConstraints;

/// Role of a column in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Part of the partition key.
    PartitionKey,
    /// Part of the clustering key.
    Clustering,
    /// Ordinary per-row column.
    Regular,
    /// Column shared by all rows of a partition.
    Static,
}

impl ColumnKind {
    /// Check if the kind is part of the primary key.
    pub fn is_primary_key(&self) -> bool {
        matches!(self, ColumnKind::PartitionKey | ColumnKind::Clustering)
    }
}

/// A column definition within a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Column name.
    pub name: ColumnIdentifier,
    /// Declared type.
    pub column_type: ColumnType,
    /// Role in the table.
    pub kind: ColumnKind,
    /// Position within the key component; 0 for non-key columns.
    pub position: u32,
    /// Constraints declared on the column.
    pub constraints: ColumnConstraints,
}

impl ColumnMetadata {
    /// Create a column with no constraints. `name` is read as CQL text.
    pub fn new(name: &str, column_type: ColumnType, kind: ColumnKind) -> Self {
        let name = ColumnIdentifier::from_cql(name);
        Self {
            constraints: ColumnConstraints::none(name.clone()),
            name,
            column_type,
            kind,
            position: 0,
        }
    }

    /// Create a partition key column.
    pub fn partition_key(name: &str, column_type: ColumnType) -> Self {
        Self::new(name, column_type, ColumnKind::PartitionKey)
    }

    /// Create a clustering column.
    pub fn clustering(name: &str, column_type: ColumnType) -> Self {
        Self::new(name, column_type, ColumnKind::Clustering)
    }

    /// Create a regular column.
    pub fn regular(name: &str, column_type: ColumnType) -> Self {
        Self::new(name, column_type, ColumnKind::Regular)
    }

    /// Create a static column.
    pub fn static_column(name: &str, column_type: ColumnType) -> Self {
        Self::new(name, column_type, ColumnKind::Static)
    }

    /// Set the column's constraints.
    pub fn with_constraints(mut self, constraints: ColumnConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Set the key position.
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = position;
        self
    }

    /// Check if the column is part of the partition key.
    pub fn is_partition_key(&self) -> bool {
        self.kind == ColumnKind::PartitionKey
    }

    /// Check if the column is a clustering column.
    pub fn is_clustering(&self) -> bool {
        self.kind == ColumnKind::Clustering
    }

    /// Check if the column is part of the primary key.
    pub fn is_primary_key_column(&self) -> bool {
        self.kind.is_primary_key()
    }

    /// Check if the column is static.
    pub fn is_static(&self) -> bool {
        self.kind == ColumnKind::Static
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_predicates() {
        let pk = ColumnMetadata::partition_key("id", ColumnType::Uuid);
        assert!(pk.is_partition_key() && pk.is_primary_key_column());

        let ck = ColumnMetadata::clustering("ts", ColumnType::Timestamp);
        assert!(ck.is_clustering() && ck.is_primary_key_column());

        let s = ColumnMetadata::static_column("owner", ColumnType::Text);
        assert!(s.is_static() && !s.is_primary_key_column());
    }

    #[test]
    fn test_name_is_cql_text() {
        let c = ColumnMetadata::regular("\"Total\"", ColumnType::BigInt);
        assert_eq!(c.name.as_str(), "Total");
        assert_eq!(c.constraints.column(), &c.name);
        assert!(c.constraints.is_empty());
    }
}
