//! Type definitions for Spaces

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a Space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpaceId(pub [u8; 32]);

impl SpaceId {
    /// Create a new random SpaceId
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut id = [0u8; 32];
        rand::rng().fill_bytes(&mut id);
        SpaceId(id)
    }

    /// Create SpaceId from bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        SpaceId(bytes)
    }

    /// Create SpaceId from a database blob
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(SpaceId)
    }

    /// Get bytes representation
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for SpaceId {
    fn from(bytes: [u8; 32]) -> Self {
        SpaceId(bytes)
    }
}

/// Error parsing a hex-encoded SpaceId
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid space id: {0}")]
pub struct ParseSpaceIdError(String);

impl FromStr for SpaceId {
    type Err = ParseSpaceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ParseSpaceIdError(e.to_string()))?;
        SpaceId::from_slice(&bytes)
            .ok_or_else(|| ParseSpaceIdError(format!("expected 32 bytes, got {}", bytes.len())))
    }
}

impl Serialize for SpaceId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SpaceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
