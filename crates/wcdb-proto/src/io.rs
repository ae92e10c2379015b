//! DataOutput/DataInput style primitives for metadata payloads.
//!
//! All integers are big-endian. Strings use the `writeUTF` layout: an
//! unsigned 16-bit byte length followed by the UTF-8 bytes.

use bytes::{Buf, BufMut};

use crate::Error;

/// Encoded size of a 32-bit integer.
pub const SIZEOF_INT: usize = 4;

/// Encoded size of a string length prefix.
pub const SIZEOF_UTF_LENGTH: usize = 2;

/// Maximum byte length of an encodable string.
pub const MAX_UTF_LENGTH: usize = u16::MAX as usize;

/// Write a big-endian 32-bit integer.
pub fn write_i32(out: &mut impl BufMut, value: i32) {
    out.put_i32(value);
}

/// Read a big-endian 32-bit integer.
pub fn read_i32(input: &mut impl Buf) -> Result<i32, Error> {
    ensure_remaining(input, SIZEOF_INT)?;
    Ok(input.get_i32())
}

/// Write a length-prefixed UTF-8 string.
pub fn write_utf(out: &mut impl BufMut, value: &str) -> Result<(), Error> {
    let bytes = value.as_bytes();
    if bytes.len() > MAX_UTF_LENGTH {
        return Err(Error::StringTooLong(bytes.len()));
    }
    out.put_u16(bytes.len() as u16);
    out.put_slice(bytes);
    Ok(())
}

/// Read a length-prefixed UTF-8 string.
pub fn read_utf(input: &mut impl Buf) -> Result<String, Error> {
    ensure_remaining(input, SIZEOF_UTF_LENGTH)?;
    let len = input.get_u16() as usize;
    ensure_remaining(input, len)?;

    let mut raw = vec![0u8; len];
    input.copy_to_slice(&mut raw);
    String::from_utf8(raw).map_err(|_| Error::InvalidUtf8)
}

/// Encoded size of a string written with [`write_utf`].
pub fn sizeof_utf(value: &str) -> usize {
    SIZEOF_UTF_LENGTH + value.len()
}

fn ensure_remaining(input: &impl Buf, needed: usize) -> Result<(), Error> {
    let remaining = input.remaining();
    if remaining < needed {
        return Err(Error::UnexpectedEof { needed, remaining });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_layout_is_big_endian() {
        let mut buf = Vec::new();
        write_i32(&mut buf, 258);
        assert_eq!(buf, vec![0, 0, 1, 2]);

        let mut input = &buf[..];
        assert_eq!(read_i32(&mut input).unwrap(), 258);
        assert!(input.is_empty());
    }

    #[test]
    fn test_utf_layout() {
        let mut buf = Vec::new();
        write_utf(&mut buf, "col").unwrap();
        assert_eq!(buf, vec![0, 3, b'c', b'o', b'l']);
        assert_eq!(sizeof_utf("col"), buf.len());

        let mut input = &buf[..];
        assert_eq!(read_utf(&mut input).unwrap(), "col");
    }

    #[test]
    fn test_multibyte_size_counts_bytes() {
        let value = "größe";
        let mut buf = Vec::new();
        write_utf(&mut buf, value).unwrap();
        assert_eq!(sizeof_utf(value), buf.len());
        assert_eq!(buf.len(), 2 + value.len());
    }

    #[test]
    fn test_string_too_long() {
        let value = "x".repeat(MAX_UTF_LENGTH + 1);
        let mut buf = Vec::new();
        assert_eq!(
            write_utf(&mut buf, &value),
            Err(Error::StringTooLong(MAX_UTF_LENGTH + 1))
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_truncated_input() {
        let mut input: &[u8] = &[0, 5, b'a'];
        assert_eq!(
            read_utf(&mut input),
            Err(Error::UnexpectedEof {
                needed: 5,
                remaining: 1
            })
        );

        let mut input: &[u8] = &[0, 1];
        assert!(matches!(
            read_i32(&mut input),
            Err(Error::UnexpectedEof { needed: 4, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut input: &[u8] = &[0, 2, 0xff, 0xfe];
        assert_eq!(read_utf(&mut input), Err(Error::InvalidUtf8));
    }
}
