//! Schema metadata format versions.

use std::fmt;

use crate::Error;

/// Format version token supplied by the metadata persistence layer.
///
/// Every metadata serializer receives the version it is reading or writing so
/// payloads can evolve without changing their kind tag. Versions only ever
/// grow; a node refuses tokens newer than the ones it knows.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    /// Initial metadata format.
    V0 = 0,
    /// Adds column constraint sets to column definitions.
    V1 = 1,
    /// Adds comparison function constraints.
    V2 = 2,
}

impl Version {
    /// The version this build writes by default.
    pub const CURRENT: Version = Version::V2;

    /// All known versions, oldest first.
    pub const ALL: [Version; 3] = [Version::V0, Version::V1, Version::V2];

    /// Integer form used on the wire.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Resolve a version token read from the wire.
    pub fn from_u32(value: u32) -> Result<Self, Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_u32() == value)
            .ok_or(Error::UnsupportedVersion(value))
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::CURRENT
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.as_u32())
    }
}
