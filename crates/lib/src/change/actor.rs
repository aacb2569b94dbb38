//! Replica identity.
//!
//! An [`ActorId`] names one authoring stream. Every document instance gets a
//! fresh random actor when it is created or loaded, so two instances never
//! mint the same `(actor, counter)` pair.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::errors::ChangeError;

/// Number of random bytes in an actor id.
pub const ACTOR_ID_LEN: usize = 16;

/// An opaque, fixed-width replica identifier.
///
/// Ordering is lexicographic over the raw bytes, which is the same order as
/// the lowercase hex rendering. The merge engine uses this order to break ties
/// between operations with equal counters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId([u8; ACTOR_ID_LEN]);

impl ActorId {
    /// Generates a new random actor id.
    pub fn random() -> Self {
        let mut bytes = [0u8; ACTOR_ID_LEN];
        rand::thread_rng().fill(&mut bytes);
        Self(bytes)
    }

    /// Creates an actor id from raw bytes.
    pub fn from_bytes(bytes: [u8; ACTOR_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ACTOR_ID_LEN] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.to_hex())
    }
}

impl FromStr for ActorId {
    type Err = ChangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ChangeError::InvalidActor {
            actor: s.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; ACTOR_ID_LEN] =
            bytes
                .try_into()
                .map_err(|b: Vec<u8>| ChangeError::InvalidActor {
                    actor: s.to_string(),
                    reason: format!("expected {ACTOR_ID_LEN} bytes, got {}", b.len()),
                })?;
        Ok(Self(bytes))
    }
}
