//! Protocol error types.

use thiserror::Error;

/// Errors raised while encoding or decoding schema metadata primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input ended before a complete value could be read.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A string field did not hold valid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8,

    /// A string is too long for the 16-bit length prefix.
    #[error("string of {0} bytes exceeds the maximum encodable length of 65535")]
    StringTooLong(usize),

    /// The metadata version token is not known to this node.
    #[error("unsupported metadata version: {0}")]
    UnsupportedVersion(u32),

    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}
