//! Composed constraints: the ordered constraint set of a column.

use std::fmt;

use bytes::{Buf, BufMut};
use tracing::warn;
use wcdb_proto::{io, MetadataSerializer, Version};

use super::codec;
use super::column_constraint::{ColumnConstraint, RawConstraint};
use crate::error::{ConstraintError, DecodeError, DefinitionError};
use crate::schema::{ColumnIdentifier, ColumnMetadata, ColumnType};

/// Parsed, not yet prepared constraint set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumnConstraints {
    /// Declaring column.
    pub column: ColumnIdentifier,
    /// Parsed children, in declaration order.
    pub constraints: Vec<RawConstraint>,
}

impl RawColumnConstraints {
    /// Collect raw children for a column.
    pub fn new(column: ColumnIdentifier, constraints: Vec<RawConstraint>) -> Self {
        Self {
            column,
            constraints,
        }
    }

    /// Prepare every child.
    pub fn prepare(self) -> ColumnConstraints {
        ColumnConstraints {
            column: self.column,
            constraints: self
                .constraints
                .into_iter()
                .map(RawConstraint::prepare)
                .collect(),
        }
    }
}

/// Ordered conjunction of constraints declared on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnConstraints {
    column: ColumnIdentifier,
    constraints: Vec<ColumnConstraint>,
}

impl ColumnConstraints {
    /// Create a constraint set.
    pub fn new(column: ColumnIdentifier, constraints: Vec<ColumnConstraint>) -> Self {
        Self {
            column,
            constraints,
        }
    }

    /// An empty constraint set.
    pub fn none(column: ColumnIdentifier) -> Self {
        Self::new(column, Vec::new())
    }

    /// Declaring column.
    pub fn column(&self) -> &ColumnIdentifier {
        &self.column
    }

    /// Iterate over the children in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnConstraint> {
        self.constraints.iter()
    }

    /// Children in order.
    pub fn as_slice(&self) -> &[ColumnConstraint] {
        &self.constraints
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Check if there are no children.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Check whether any child forbids null values.
    pub fn has_not_null(&self) -> bool {
        self.constraints.iter().any(ColumnConstraint::requires_value)
    }

    pub(crate) fn evaluate_non_null(
        &self,
        value_type: &ColumnType,
        value: &[u8],
    ) -> Result<(), ConstraintError> {
        self.constraints
            .iter()
            .try_for_each(|c| c.evaluate(value_type, value))
    }

    pub(crate) fn validate(&self, column: &ColumnMetadata) -> Result<(), DefinitionError> {
        self.constraints.iter().try_for_each(|c| c.validate(column))
    }
}

impl<'a> IntoIterator for &'a ColumnConstraints {
    type Item = &'a ColumnConstraint;
    type IntoIter = std::slice::Iter<'a, ColumnConstraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ColumnConstraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, constraint) in self.constraints.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{constraint}")?;
        }
        Ok(())
    }
}

/// Payload: column, then the list encoding of the children.
pub struct ComposedSerializer;

impl MetadataSerializer<ColumnConstraints> for ComposedSerializer {
    type DecodeError = DecodeError;

    fn serialize<B: BufMut>(
        &self,
        constraints: &ColumnConstraints,
        out: &mut B,
        version: Version,
    ) -> Result<(), wcdb_proto::Error> {
        io::write_utf(out, &constraints.column.to_cql_string())?;
        codec::serialize_all(&constraints.constraints, out, version)
    }

    fn deserialize<B: Buf>(
        &self,
        input: &mut B,
        version: Version,
    ) -> Result<ColumnConstraints, DecodeError> {
        read_payload(input, version, 1)
    }

    fn serialized_size(&self, constraints: &ColumnConstraints, version: Version) -> usize {
        io::sizeof_utf(&constraints.column.to_cql_string())
            + codec::serialized_size_all(&constraints.constraints, version)
    }
}

/// Read a composed payload that is itself enclosed by `depth - 1` composed
/// envelopes.
pub(super) fn read_payload<B: Buf>(
    input: &mut B,
    version: Version,
    depth: usize,
) -> Result<ColumnConstraints, DecodeError> {
    if depth > codec::MAX_NESTING_DEPTH {
        warn!(depth, "composed constraint nesting too deep in schema metadata");
        return Err(DecodeError::NestingTooDeep(depth));
    }
    let column = ColumnIdentifier::from_cql(&io::read_utf(input)?);
    let constraints = codec::deserialize_all_nested(input, version, depth)?;
    Ok(ColumnConstraints::new(column, constraints))
}
