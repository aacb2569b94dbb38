//! Content-addressable identifier for changes.
//!
//! A [`ChangeHash`] is the SHA-256 digest of a change's canonical encoding,
//! which makes every change self-identifying and tamper-evident.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::errors::ChangeError;

/// Length of a change hash in bytes.
pub const HASH_LEN: usize = 32;

/// The SHA-256 digest identifying a [`Change`](super::Change).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChangeHash([u8; HASH_LEN]);

impl ChangeHash {
    /// Hash arbitrary bytes.
    pub fn digest(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hasher.finalize().into())
    }

    /// Wraps raw digest bytes.
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First eight hex characters, for logs and tables.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for ChangeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ChangeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChangeHash({})", self.to_hex())
    }
}

impl FromStr for ChangeHash {
    type Err = ChangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ChangeError::InvalidHash {
            hash: s.to_string(),
            reason,
        };
        let bytes = hex::decode(s).map_err(|e| invalid(e.to_string()))?;
        let bytes: [u8; HASH_LEN] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| invalid(format!("expected {HASH_LEN} bytes, got {}", b.len())))?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for ChangeHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
