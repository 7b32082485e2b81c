//! Core identifier types shared by the local and remote sides of a sync.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash of a blob, rendered as lowercase hex.
///
/// Local hashes come from [`crate::tree::hasher`] and remote hashes come straight from the
/// tree listing; both are stored in the same lowercase form so equality is plain string
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobHash(String);

impl BlobHash {
    /// Wrap a hex digest, lowercasing it.
    pub fn new(hex: impl Into<String>) -> Self {
        let mut hex = hex.into();
        hex.make_ascii_lowercase();
        Self(hex)
    }

    /// Build a hash from raw digest bytes.
    pub fn from_digest(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First seven characters, for log lines.
    pub fn short(&self) -> &str {
        let end = self.0.len().min(7);
        &self.0[..end]
    }
}

impl fmt::Display for BlobHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlobHash {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BlobHash {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
