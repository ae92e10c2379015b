//! Relational operators usable in comparison constraints.

use std::cmp::Ordering;
use std::fmt;

use bytes::{Buf, BufMut};
use wcdb_proto::io;

use crate::error::DecodeError;

/// A relational operator.
///
/// Each operator has a stable integer id that is written to schema metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `>=`
    Gte,
    /// `>`
    Gt,
    /// `<=`
    Lte,
    /// `<`
    Lt,
    /// `!=`
    Neq,
}

impl Operator {
    /// All operators.
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Gte,
        Operator::Gt,
        Operator::Lte,
        Operator::Lt,
        Operator::Neq,
    ];

    /// Wire id of the operator.
    pub fn id(&self) -> i32 {
        match self {
            Operator::Eq => 0,
            Operator::Gte => 1,
            Operator::Gt => 2,
            Operator::Lte => 3,
            Operator::Lt => 4,
            Operator::Neq => 8,
        }
    }

    /// Resolve a wire id.
    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.id() == id)
    }

    /// CQL symbol of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gte => ">=",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Lt => "<",
            Operator::Neq => "!=",
        }
    }

    /// Resolve a CQL symbol. `<>` is accepted for `!=`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Operator::Eq),
            ">=" => Some(Operator::Gte),
            ">" => Some(Operator::Gt),
            "<=" => Some(Operator::Lte),
            "<" => Some(Operator::Lt),
            "!=" | "<>" => Some(Operator::Neq),
            _ => None,
        }
    }

    /// Check whether `left <op> right` holds given their ordering.
    pub fn is_satisfied_by(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Gte => ordering != Ordering::Less,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Lte => ordering != Ordering::Greater,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Neq => ordering != Ordering::Equal,
        }
    }

    /// Write the operator id.
    pub fn write_to(&self, out: &mut impl BufMut) {
        io::write_i32(out, self.id());
    }

    /// Read an operator id.
    pub fn read_from(input: &mut impl Buf) -> Result<Self, DecodeError> {
        let id = io::read_i32(input)?;
        Self::from_id(id).ok_or(DecodeError::UnknownOperator(id))
    }

    /// Encoded size of an operator.
    pub const fn serialized_size() -> usize {
        io::SIZEOF_INT
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
