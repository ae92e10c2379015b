//! Native column types and their value representations.
//!
//! Column values travel through the write path as raw byte buffers in the
//! type's serialized form. A zero-length buffer is the CQL null sentinel and
//! never reaches [`ColumnType::decode`] from the constraint evaluator.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use rkyv::{Archive, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors converting between literals, buffers and typed values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarshalError {
    /// A literal could not be parsed by the type's parser.
    #[error("unable to make {column_type} from '{literal}'")]
    InvalidLiteral {
        /// Target type.
        column_type: ColumnType,
        /// Offending literal.
        literal: String,
    },

    /// A fixed-width value had the wrong number of bytes.
    #[error("expected {expected} bytes for {column_type} value, got {actual}")]
    InvalidLength {
        /// Declared type.
        column_type: ColumnType,
        /// Width of the type.
        expected: usize,
        /// Width of the buffer.
        actual: usize,
    },

    /// A text value was not valid for its type.
    #[error("invalid {column_type} bytes")]
    InvalidText {
        /// Declared type.
        column_type: ColumnType,
    },
}

/// Native column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
pub enum ColumnType {
    /// US-ASCII string.
    Ascii,
    /// 64-bit signed integer.
    BigInt,
    /// Arbitrary bytes.
    Blob,
    /// Boolean.
    Boolean,
    /// Distributed counter (64-bit).
    Counter,
    /// 64-bit IEEE-754 float.
    Double,
    /// 32-bit IEEE-754 float.
    Float,
    /// 32-bit signed integer.
    Int,
    /// 16-bit signed integer.
    SmallInt,
    /// UTF-8 string.
    Text,
    /// Milliseconds since the Unix epoch.
    Timestamp,
    /// 8-bit signed integer.
    TinyInt,
    /// 128-bit UUID.
    Uuid,
}

/// A decoded column value, borrowing from its source where possible.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue<'a> {
    /// Boolean value.
    Boolean(bool),
    /// Any integer type, widened.
    Integer(i64),
    /// Any floating point type, widened.
    Float(f64),
    /// Text value.
    Text(Cow<'a, str>),
    /// Binary value.
    Bytes(Cow<'a, [u8]>),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    /// UUID bytes.
    Uuid([u8; 16]),
}

impl ColumnType {
    /// Every native type, in CQL name order.
    pub const ALL: [ColumnType; 13] = [
        ColumnType::Ascii,
        ColumnType::BigInt,
        ColumnType::Blob,
        ColumnType::Boolean,
        ColumnType::Counter,
        ColumnType::Double,
        ColumnType::Float,
        ColumnType::Int,
        ColumnType::SmallInt,
        ColumnType::Text,
        ColumnType::Timestamp,
        ColumnType::TinyInt,
        ColumnType::Uuid,
    ];

    /// Check if this type is numeric.
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            ColumnType::BigInt
                | ColumnType::Counter
                | ColumnType::Double
                | ColumnType::Float
                | ColumnType::Int
                | ColumnType::SmallInt
                | ColumnType::TinyInt
        )
    }

    /// Check if this type is a string type.
    pub fn is_string(&self) -> bool {
        matches!(self, ColumnType::Ascii | ColumnType::Text)
    }

    /// CQL name of the type.
    pub fn cql_name(&self) -> &'static str {
        match self {
            ColumnType::Ascii => "ascii",
            ColumnType::BigInt => "bigint",
            ColumnType::Blob => "blob",
            ColumnType::Boolean => "boolean",
            ColumnType::Counter => "counter",
            ColumnType::Double => "double",
            ColumnType::Float => "float",
            ColumnType::Int => "int",
            ColumnType::SmallInt => "smallint",
            ColumnType::Text => "text",
            ColumnType::Timestamp => "timestamp",
            ColumnType::TinyInt => "tinyint",
            ColumnType::Uuid => "uuid",
        }
    }

    /// Resolve a CQL type name (case-insensitive, `varchar` is `text`).
    pub fn from_cql_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        if name == "varchar" {
            return Some(ColumnType::Text);
        }
        Self::ALL.iter().copied().find(|t| t.cql_name() == name)
    }

    /// Width of the serialized form for fixed-width types.
    pub fn fixed_length(&self) -> Option<usize> {
        match self {
            ColumnType::Boolean | ColumnType::TinyInt => Some(1),
            ColumnType::SmallInt => Some(2),
            ColumnType::Int | ColumnType::Float => Some(4),
            ColumnType::BigInt
            | ColumnType::Counter
            | ColumnType::Double
            | ColumnType::Timestamp => Some(8),
            ColumnType::Uuid => Some(16),
            ColumnType::Ascii | ColumnType::Blob | ColumnType::Text => None,
        }
    }

    /// Parse a literal with this type's parser.
    pub fn parse_literal<'a>(&self, literal: &'a str) -> Result<ScalarValue<'a>, MarshalError> {
        let trimmed = literal.trim();
        let invalid = || MarshalError::InvalidLiteral {
            column_type: *self,
            literal: literal.to_string(),
        };

        let value = match self {
            ColumnType::TinyInt => {
                ScalarValue::Integer(trimmed.parse::<i8>().map_err(|_| invalid())?.into())
            }
            ColumnType::SmallInt => {
                ScalarValue::Integer(trimmed.parse::<i16>().map_err(|_| invalid())?.into())
            }
            ColumnType::Int => {
                ScalarValue::Integer(trimmed.parse::<i32>().map_err(|_| invalid())?.into())
            }
            ColumnType::BigInt | ColumnType::Counter => {
                ScalarValue::Integer(trimmed.parse::<i64>().map_err(|_| invalid())?)
            }
            ColumnType::Float => {
                ScalarValue::Float(trimmed.parse::<f32>().map_err(|_| invalid())?.into())
            }
            ColumnType::Double => ScalarValue::Float(trimmed.parse::<f64>().map_err(|_| invalid())?),
            ColumnType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" => ScalarValue::Boolean(true),
                "false" => ScalarValue::Boolean(false),
                _ => return Err(invalid()),
            },
            ColumnType::Timestamp => {
                ScalarValue::Timestamp(trimmed.parse::<i64>().map_err(|_| invalid())?)
            }
            ColumnType::Uuid => ScalarValue::Uuid(parse_uuid(trimmed).ok_or_else(invalid)?),
            ColumnType::Blob => {
                let digits = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                    .ok_or_else(invalid)?;
                ScalarValue::Bytes(Cow::Owned(hex::decode(digits).map_err(|_| invalid())?))
            }
            ColumnType::Ascii => {
                if !literal.is_ascii() {
                    return Err(invalid());
                }
                ScalarValue::Text(Cow::Borrowed(literal))
            }
            ColumnType::Text => ScalarValue::Text(Cow::Borrowed(literal)),
        };

        Ok(value)
    }

    /// Decode a serialized, non-null value of this type.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<ScalarValue<'a>, MarshalError> {
        if let Some(expected) = self.fixed_length() {
            if bytes.len() != expected {
                return Err(MarshalError::InvalidLength {
                    column_type: *self,
                    expected,
                    actual: bytes.len(),
                });
            }
        }

        let value = match self {
            ColumnType::TinyInt => ScalarValue::Integer(i8::from_be_bytes([bytes[0]]).into()),
            ColumnType::SmallInt => {
                ScalarValue::Integer(i16::from_be_bytes([bytes[0], bytes[1]]).into())
            }
            ColumnType::Int => ScalarValue::Integer(i32::from_be_bytes(fixed::<4>(bytes)).into()),
            ColumnType::BigInt | ColumnType::Counter => {
                ScalarValue::Integer(i64::from_be_bytes(fixed::<8>(bytes)))
            }
            ColumnType::Float => ScalarValue::Float(f32::from_be_bytes(fixed::<4>(bytes)).into()),
            ColumnType::Double => ScalarValue::Float(f64::from_be_bytes(fixed::<8>(bytes))),
            ColumnType::Boolean => ScalarValue::Boolean(bytes[0] != 0),
            ColumnType::Timestamp => ScalarValue::Timestamp(i64::from_be_bytes(fixed::<8>(bytes))),
            ColumnType::Uuid => ScalarValue::Uuid(fixed::<16>(bytes)),
            ColumnType::Blob => ScalarValue::Bytes(Cow::Borrowed(bytes)),
            ColumnType::Ascii => {
                if !bytes.is_ascii() {
                    return Err(MarshalError::InvalidText { column_type: *self });
                }
                // ASCII is always valid UTF-8.
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| MarshalError::InvalidText { column_type: *self })?;
                ScalarValue::Text(Cow::Borrowed(text))
            }
            ColumnType::Text => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| MarshalError::InvalidText { column_type: *self })?;
                ScalarValue::Text(Cow::Borrowed(text))
            }
        };

        Ok(value)
    }

    /// Serialize a literal into this type's binary form.
    pub fn from_string(&self, literal: &str) -> Result<Vec<u8>, MarshalError> {
        let value = self.parse_literal(literal)?;
        Ok(self.encode(&value))
    }

    /// Serialize a typed value into this type's binary form.
    ///
    /// The value is expected to come from this type's parser or decoder.
    pub fn encode(&self, value: &ScalarValue<'_>) -> Vec<u8> {
        match (self, value) {
            (ColumnType::TinyInt, ScalarValue::Integer(n)) => (*n as i8).to_be_bytes().to_vec(),
            (ColumnType::SmallInt, ScalarValue::Integer(n)) => (*n as i16).to_be_bytes().to_vec(),
            (ColumnType::Int, ScalarValue::Integer(n)) => (*n as i32).to_be_bytes().to_vec(),
            (_, ScalarValue::Integer(n)) => n.to_be_bytes().to_vec(),
            (ColumnType::Float, ScalarValue::Float(f)) => (*f as f32).to_be_bytes().to_vec(),
            (_, ScalarValue::Float(f)) => f.to_be_bytes().to_vec(),
            (_, ScalarValue::Boolean(b)) => vec![u8::from(*b)],
            (_, ScalarValue::Timestamp(ms)) => ms.to_be_bytes().to_vec(),
            (_, ScalarValue::Uuid(uuid)) => uuid.to_vec(),
            (_, ScalarValue::Text(text)) => text.as_bytes().to_vec(),
            (_, ScalarValue::Bytes(bytes)) => bytes.to_vec(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cql_name())
    }
}

impl ScalarValue<'_> {
    /// Compare two values of the same type.
    ///
    /// Floats use a total order so NaN compares consistently. Returns `None`
    /// for values of different kinds.
    pub fn compare(&self, other: &ScalarValue<'_>) -> Option<Ordering> {
        match (self, other) {
            (ScalarValue::Boolean(a), ScalarValue::Boolean(b)) => Some(a.cmp(b)),
            (ScalarValue::Integer(a), ScalarValue::Integer(b)) => Some(a.cmp(b)),
            (ScalarValue::Float(a), ScalarValue::Float(b)) => Some(a.total_cmp(b)),
            (ScalarValue::Text(a), ScalarValue::Text(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (ScalarValue::Bytes(a), ScalarValue::Bytes(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (ScalarValue::Timestamp(a), ScalarValue::Timestamp(b)) => Some(a.cmp(b)),
            (ScalarValue::Uuid(a), ScalarValue::Uuid(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn fixed<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes[..N]);
    buf
}

fn parse_uuid(text: &str) -> Option<[u8; 16]> {
    // CQL uuid literals are always in hyphenated form.
    if text.len() != 36 {
        return None;
    }
    Uuid::parse_str(text).ok().map(|uuid| *uuid.as_bytes())
}
