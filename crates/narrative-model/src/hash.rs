//! Content fingerprint primitives
//!
//! Provides [`Fingerprint`], a strongly-typed 16-byte identifier used as the
//! cache key and equality proxy for every derived artifact.

use sha2::{Digest, Sha256};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of bytes kept from the SHA-256 digest
pub const FINGERPRINT_LEN: usize = 16;

/// Length of the hex rendering (what callers see on the wire)
pub const FINGERPRINT_HEX_LEN: usize = FINGERPRINT_LEN * 2;

/// A truncated SHA-256 fingerprint
///
/// Rendered as 32 lowercase hex characters. Callers must treat the rendering
/// as opaque and never assume the full digest length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Create a fingerprint from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Create fingerprint from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly [`FINGERPRINT_LEN`] bytes
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        if bytes.len() != FINGERPRINT_LEN {
            return Err(HashError::InvalidLength {
                expected: FINGERPRINT_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; FINGERPRINT_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Hash arbitrary data and keep the leading bytes of the digest
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        let mut arr = [0u8; FINGERPRINT_LEN];
        arr.copy_from_slice(&digest[..FINGERPRINT_LEN]);
        Self(arr)
    }

    /// Hash a textual canonical form
    #[inline]
    #[must_use]
    pub fn compute_str(content: &str) -> Self {
        Self::compute(content.as_bytes())
    }

    /// Short string representation (first 8 hex chars), for log lines
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for Fingerprint {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(HashError::NotLowercase);
        }
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8]> for Fingerprint {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing fingerprints
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Invalid fingerprint length
    #[error("invalid fingerprint length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Upper-case hex is not canonical
    #[error("fingerprint must be lowercase hex")]
    NotLowercase,

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}
