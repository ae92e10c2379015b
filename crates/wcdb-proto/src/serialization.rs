//! Version-aware metadata serializer contract.

use bytes::{Buf, BufMut};

use crate::{Error, Version};

/// Codec for one kind of schema metadata value.
///
/// Implementations write their fields in a fixed order and must report the
/// exact number of bytes [`serialize`](MetadataSerializer::serialize) would
/// produce from [`serialized_size`](MetadataSerializer::serialized_size), so
/// callers can size envelopes up front.
pub trait MetadataSerializer<T> {
    /// Error returned when reading a value back.
    type DecodeError: From<Error>;

    /// Write `value` using the layout of `version`.
    fn serialize<B: BufMut>(&self, value: &T, out: &mut B, version: Version)
        -> Result<(), Error>;

    /// Read a value written with the layout of `version`.
    fn deserialize<B: Buf>(&self, input: &mut B, version: Version)
        -> Result<T, Self::DecodeError>;

    /// Exact encoded size of `value` under `version`.
    fn serialized_size(&self, value: &T, version: Version) -> usize;
}
