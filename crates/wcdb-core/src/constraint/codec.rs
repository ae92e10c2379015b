//! Envelope and list encoding of constraints in schema metadata.
//!
//! An envelope is the kind tag as a big-endian `i32` followed by the
//! variant's payload. A list is an `i32` count followed by that many
//! envelopes. The [`Version`] is passed down to every payload serializer.
//!
//! Composed payloads nest lists inside envelopes; decoding rejects nesting
//! deeper than [`MAX_NESTING_DEPTH`].

use bytes::{Buf, BufMut};
use tracing::warn;
use wcdb_proto::{io, MetadataSerializer, Version};

use super::column_constraint::ColumnConstraint;
use super::composed::{self, ComposedSerializer};
use super::function_comparison::FunctionSerializer;
use super::scalar::ScalarSerializer;
use super::unary::UnaryFunctionSerializer;
use super::ConstraintKind;
use crate::error::DecodeError;

/// Maximum number of composed envelopes enclosing one another on decode.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Write one constraint envelope.
pub fn serialize<B: BufMut>(
    constraint: &ColumnConstraint,
    out: &mut B,
    version: Version,
) -> Result<(), wcdb_proto::Error> {
    io::write_i32(out, constraint.kind().tag());
    match constraint {
        ColumnConstraint::Composed(c) => ComposedSerializer.serialize(c, out, version),
        ColumnConstraint::Function(c) => FunctionSerializer.serialize(c, out, version),
        ColumnConstraint::Scalar(c) => ScalarSerializer.serialize(c, out, version),
        ColumnConstraint::UnaryFunction(c) => UnaryFunctionSerializer.serialize(c, out, version),
    }
}

/// Read one constraint envelope.
pub fn deserialize<B: Buf>(input: &mut B, version: Version) -> Result<ColumnConstraint, DecodeError> {
    deserialize_nested(input, version, 0)
}

/// Read one envelope enclosed by `depth` composed envelopes.
pub(super) fn deserialize_nested<B: Buf>(
    input: &mut B,
    version: Version,
    depth: usize,
) -> Result<ColumnConstraint, DecodeError> {
    let tag = io::read_i32(input)?;
    let kind = ConstraintKind::from_tag(tag).ok_or_else(|| {
        warn!(tag, "unknown constraint kind in schema metadata");
        DecodeError::UnknownKind(tag)
    })?;

    let constraint = match kind {
        ConstraintKind::Composed => composed::read_payload(input, version, depth + 1)?.into(),
        ConstraintKind::Function => FunctionSerializer.deserialize(input, version)?.into(),
        ConstraintKind::Scalar => ScalarSerializer.deserialize(input, version)?.into(),
        ConstraintKind::UnaryFunction => {
            UnaryFunctionSerializer.deserialize(input, version)?.into()
        }
    };
    Ok(constraint)
}

/// Exact size of one envelope.
pub fn serialized_size(constraint: &ColumnConstraint, version: Version) -> usize {
    io::SIZEOF_INT
        + match constraint {
            ColumnConstraint::Composed(c) => ComposedSerializer.serialized_size(c, version),
            ColumnConstraint::Function(c) => FunctionSerializer.serialized_size(c, version),
            ColumnConstraint::Scalar(c) => ScalarSerializer.serialized_size(c, version),
            ColumnConstraint::UnaryFunction(c) => {
                UnaryFunctionSerializer.serialized_size(c, version)
            }
        }
}

/// Write a counted list of envelopes.
pub fn serialize_all<B: BufMut>(
    constraints: &[ColumnConstraint],
    out: &mut B,
    version: Version,
) -> Result<(), wcdb_proto::Error> {
    let count = i32::try_from(constraints.len()).map_err(|_| {
        wcdb_proto::Error::Serialization(format!(
            "too many constraints in one list: {}",
            constraints.len()
        ))
    })?;
    io::write_i32(out, count);
    constraints
        .iter()
        .try_for_each(|c| serialize(c, out, version))
}

/// Read a counted list of envelopes.
pub fn deserialize_all<B: Buf>(
    input: &mut B,
    version: Version,
) -> Result<Vec<ColumnConstraint>, DecodeError> {
    deserialize_all_nested(input, version, 0)
}

pub(super) fn deserialize_all_nested<B: Buf>(
    input: &mut B,
    version: Version,
    depth: usize,
) -> Result<Vec<ColumnConstraint>, DecodeError> {
    let count = io::read_i32(input)?;
    let count = usize::try_from(count).map_err(|_| DecodeError::NegativeCount(count))?;

    // Every envelope is at least a tag, so a count beyond that bound is
    // truncated input and must not drive the allocation.
    let mut constraints = Vec::with_capacity(count.min(input.remaining() / io::SIZEOF_INT));
    for _ in 0..count {
        constraints.push(deserialize_nested(input, version, depth)?);
    }
    Ok(constraints)
}

/// Exact size of a counted list.
pub fn serialized_size_all(constraints: &[ColumnConstraint], version: Version) -> usize {
    io::SIZEOF_INT
        + constraints
            .iter()
            .map(|c| serialized_size(c, version))
            .sum::<usize>()
}

/// [`MetadataSerializer`] over whole constraint envelopes.
pub struct ConstraintSerializer;

impl MetadataSerializer<ColumnConstraint> for ConstraintSerializer {
    type DecodeError = DecodeError;

    fn serialize<B: BufMut>(
        &self,
        constraint: &ColumnConstraint,
        out: &mut B,
        version: Version,
    ) -> Result<(), wcdb_proto::Error> {
        serialize(constraint, out, version)
    }

    fn deserialize<B: Buf>(
        &self,
        input: &mut B,
        version: Version,
    ) -> Result<ColumnConstraint, DecodeError> {
        deserialize(input, version)
    }

    fn serialized_size(&self, constraint: &ColumnConstraint, version: Version) -> usize {
        serialized_size(constraint, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{
        ColumnConstraints, Operator, RawFunctionConstraint, RawScalarConstraint,
        RawUnaryFunctionConstraint,
    };
    use crate::error::DefinitionError;
    use crate::schema::ColumnIdentifier;

    fn col(name: &str) -> ColumnIdentifier {
        ColumnIdentifier::from_cql(name)
    }

    fn samples() -> Vec<ColumnConstraint> {
        let scalar: ColumnConstraint =
            RawScalarConstraint::new(col("v"), Operator::Neq, "-3").prepare().into();
        let unary: ColumnConstraint = RawUnaryFunctionConstraint::new("NOT_NULL", col("v"))
            .unwrap()
            .prepare()
            .into();
        let function: ColumnConstraint =
            RawFunctionConstraint::new("LENGTH", col("\"Name\""), Operator::Lte, "10")
                .unwrap()
                .prepare()
                .into();
        let nested = ColumnConstraints::new(
            col("v"),
            vec![
                scalar.clone(),
                ColumnConstraints::new(col("v"), vec![unary.clone()]).into(),
            ],
        );
        vec![scalar, unary, function, nested.into()]
    }

    #[test]
    fn test_round_trip_with_exact_size() {
        for constraint in samples() {
            for version in Version::ALL {
                let mut buf = Vec::new();
                serialize(&constraint, &mut buf, version).unwrap();
                assert_eq!(buf.len(), serialized_size(&constraint, version), "{constraint}");

                let mut input = &buf[..];
                assert_eq!(deserialize(&mut input, version).unwrap(), constraint);
                assert!(input.is_empty());
            }
        }
    }

    #[test]
    fn test_list_round_trip() {
        let constraints = samples();
        let mut buf = Vec::new();
        serialize_all(&constraints, &mut buf, Version::CURRENT).unwrap();
        assert_eq!(buf.len(), serialized_size_all(&constraints, Version::CURRENT));

        let mut input = &buf[..];
        assert_eq!(deserialize_all(&mut input, Version::CURRENT).unwrap(), constraints);
    }

    #[test]
    fn test_empty_list() {
        let mut buf = Vec::new();
        serialize_all(&[], &mut buf, Version::CURRENT).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 0]);

        let mut input = &buf[..];
        assert!(deserialize_all(&mut input, Version::CURRENT).unwrap().is_empty());
    }

    #[test]
    fn test_scalar_envelope_layout() {
        let c: ColumnConstraint =
            RawScalarConstraint::new(col("a"), Operator::Gt, "5").prepare().into();
        let mut buf = Vec::new();
        serialize(&c, &mut buf, Version::CURRENT).unwrap();
        assert_eq!(
            buf,
            vec![
                0, 0, 0, 2, // scalar tag
                0, 1, b'a', // column
                0, 0, 0, 2, // operator '>'
                0, 1, b'5', // term
            ]
        );
    }

    #[test]
    fn test_unary_envelope_layout() {
        let c: ColumnConstraint = RawUnaryFunctionConstraint::new("NOT_NULL", col("a"))
            .unwrap()
            .prepare()
            .into();
        let mut buf = Vec::new();
        serialize(&c, &mut buf, Version::CURRENT).unwrap();

        let mut expected = vec![0, 0, 0, 3, 0, 1, b'a', 0, 8];
        expected.extend_from_slice(b"NOT_NULL");
        assert_eq!(buf, expected);
    }

    #[test]
    fn test_composed_envelope_layout() {
        let c: ColumnConstraint = ColumnConstraints::new(
            col("a"),
            vec![
                RawScalarConstraint::new(col("a"), Operator::Gt, "5").prepare().into(),
                RawScalarConstraint::new(col("a"), Operator::Neq, "9").prepare().into(),
            ],
        )
        .into();
        let mut buf = Vec::new();
        serialize(&c, &mut buf, Version::CURRENT).unwrap();
        assert_eq!(
            buf,
            vec![
                0, 0, 0, 0, // composed tag
                0, 1, b'a', // column
                0, 0, 0, 2, // child count
                0, 0, 0, 2, 0, 1, b'a', 0, 0, 0, 2, 0, 1, b'5', // a > 5
                0, 0, 0, 2, 0, 1, b'a', 0, 0, 0, 8, 0, 1, b'9', // a != 9
            ]
        );
    }

    #[test]
    fn test_unknown_kind() {
        let mut input: &[u8] = &[0, 0, 0, 9];
        assert_eq!(
            deserialize(&mut input, Version::CURRENT).unwrap_err(),
            DecodeError::UnknownKind(9)
        );

        let mut input: &[u8] = &[0xff, 0xff, 0xff, 0xff];
        assert_eq!(
            deserialize(&mut input, Version::CURRENT).unwrap_err(),
            DecodeError::UnknownKind(-1)
        );
    }

    #[test]
    fn test_negative_count() {
        let mut input: &[u8] = &[0xff, 0xff, 0xff, 0xfe];
        assert_eq!(
            deserialize_all(&mut input, Version::CURRENT).unwrap_err(),
            DecodeError::NegativeCount(-2)
        );
    }

    #[test]
    fn test_truncated_input() {
        let mut buf = Vec::new();
        serialize_all(&samples(), &mut buf, Version::CURRENT).unwrap();
        for len in 0..buf.len() {
            let mut input = &buf[..len];
            let err = deserialize_all(&mut input, Version::CURRENT).unwrap_err();
            assert!(
                matches!(err, DecodeError::Io(wcdb_proto::Error::UnexpectedEof { .. })),
                "prefix of {len} bytes: {err:?}"
            );
        }
    }

    /// `levels` composed envelopes, each holding the next; the innermost is empty.
    fn nested_composed(levels: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        for level in 1..=levels {
            io::write_i32(&mut buf, ConstraintKind::Composed.tag());
            io::write_utf(&mut buf, "v").unwrap();
            io::write_i32(&mut buf, if level < levels { 1 } else { 0 });
        }
        buf
    }

    #[test]
    fn test_nesting_depth_limit() {
        let buf = nested_composed(MAX_NESTING_DEPTH);
        let mut input = &buf[..];
        assert!(deserialize(&mut input, Version::CURRENT).is_ok());
        assert!(input.is_empty());

        let buf = nested_composed(MAX_NESTING_DEPTH + 1);
        let mut input = &buf[..];
        assert_eq!(
            deserialize(&mut input, Version::CURRENT).unwrap_err(),
            DecodeError::NestingTooDeep(MAX_NESTING_DEPTH + 1)
        );
    }

    #[test]
    fn test_deeply_nested_input_fails_without_overflow() {
        let mut buf = Vec::new();
        io::write_i32(&mut buf, 1);
        buf.extend(nested_composed(200_000));

        let mut input = &buf[..];
        assert_eq!(
            deserialize_all(&mut input, Version::CURRENT).unwrap_err(),
            DecodeError::NestingTooDeep(MAX_NESTING_DEPTH + 1)
        );

        let mut input = &buf[4..];
        assert_eq!(
            deserialize(&mut input, Version::CURRENT).unwrap_err(),
            DecodeError::NestingTooDeep(MAX_NESTING_DEPTH + 1)
        );

        // The payload serializer alone counts its own envelope as the first level.
        let mut payload = &buf[8..];
        assert_eq!(
            ComposedSerializer
                .deserialize(&mut payload, Version::CURRENT)
                .unwrap_err(),
            DecodeError::NestingTooDeep(MAX_NESTING_DEPTH + 1)
        );
    }

    #[test]
    fn test_oversized_count_is_truncation() {
        let mut input: &[u8] = &[0x7f, 0xff, 0xff, 0xff];
        let err = deserialize_all(&mut input, Version::CURRENT).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }

    #[test]
    fn test_unknown_function_in_nested_list() {
        let mut buf = Vec::new();
        io::write_i32(&mut buf, 1);
        io::write_i32(&mut buf, ConstraintKind::UnaryFunction.tag());
        io::write_utf(&mut buf, "v").unwrap();
        io::write_utf(&mut buf, "UNIQUE").unwrap();

        let mut input = &buf[..];
        assert_eq!(
            deserialize_all(&mut input, Version::CURRENT).unwrap_err(),
            DecodeError::UnknownFunction(DefinitionError::UnrecognizedFunction("UNIQUE".into()))
        );
    }

    #[test]
    fn test_trait_object_matches_free_functions() {
        let c = samples().remove(2);
        let mut via_trait = Vec::new();
        ConstraintSerializer
            .serialize(&c, &mut via_trait, Version::V1)
            .unwrap();
        let mut via_fn = Vec::new();
        serialize(&c, &mut via_fn, Version::V1).unwrap();
        assert_eq!(via_trait, via_fn);
    }
}
