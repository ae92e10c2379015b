//! Constraint subsystem configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use wcdb_proto::Version;

use crate::error::{Error, Result};

/// Default maximum length of a constraint term.
pub const DEFAULT_MAX_TERM_LENGTH: usize = 1024;

/// Configuration for constraint validation and enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    /// Evaluate constraints on writes.
    ///
    /// Missing-column and deletion checks run regardless.
    pub enforce_on_write: bool,

    /// Metadata version used when writing table snapshots.
    #[serde(with = "version_format")]
    pub metadata_version: Version,

    /// Maximum number of characters of a constraint term.
    pub max_term_length: usize,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            enforce_on_write: true,
            metadata_version: Version::CURRENT,
            max_term_length: DEFAULT_MAX_TERM_LENGTH,
        }
    }
}

impl ConstraintConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Set whether constraints are evaluated on writes.
    pub fn with_enforce_on_write(mut self, enforce: bool) -> Self {
        self.enforce_on_write = enforce;
        self
    }

    /// Set the metadata version used for snapshots.
    pub fn with_metadata_version(mut self, version: Version) -> Self {
        self.metadata_version = version;
        self
    }

    /// Set the maximum term length.
    pub fn with_max_term_length(mut self, max: usize) -> Self {
        self.max_term_length = max;
        self
    }
}

mod version_format {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use wcdb_proto::Version;

    pub fn serialize<S: Serializer>(version: &Version, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(version.as_u32())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Version, D::Error> {
        let raw = u32::deserialize(deserializer)?;
        Version::from_u32(raw).map_err(de::Error::custom)
    }
}
