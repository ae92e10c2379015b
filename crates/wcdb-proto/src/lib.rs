//! WCDB schema metadata wire primitives.
//!
//! This crate holds the low-level pieces every schema metadata codec is built
//! from: the metadata [`Version`] token, big-endian read/write helpers in
//! [`io`], and the [`MetadataSerializer`] contract.
//!
//! # Modules
//!
//! - [`version`] - Metadata format versions
//! - [`io`] - Integer and string primitives
//! - [`serialization`] - Serializer trait
//! - [`error`] - Protocol error types

pub mod error;
pub mod io;
pub mod serialization;
pub mod version;

pub use error::Error;
pub use serialization::MetadataSerializer;
pub use version::Version;
