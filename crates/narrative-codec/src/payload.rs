//! The unit that crosses the system boundary

use narrative_model::{Fingerprint, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::to_canonical_string;
use crate::error::{CodecError, CodecResult};

/// Schema-versioned, fingerprinted data
///
/// The only thing that leaves the process or touches storage. Its wire
/// encoding ([`Self::to_json`]) is canonical, so equal payloads are equal
/// bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedPayload {
    pub schema_version: String,
    pub fingerprint: Fingerprint,
    pub data: Value,
}

impl SerializedPayload {
    /// Wrap `data` under the current schema version
    #[inline]
    #[must_use]
    pub fn new(fingerprint: Fingerprint, data: Value) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            fingerprint,
            data,
        }
    }

    #[inline]
    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Canonical JSON text: sorted keys, compact separators
    ///
    /// # Errors
    /// Returns [`CodecError::Json`] if the data holds unrepresentable values
    pub fn to_json(&self) -> CodecResult<String> {
        to_canonical_string(self)
    }

    /// Canonical JSON bytes, as written to durable storage
    ///
    /// # Errors
    /// See [`Self::to_json`]
    pub fn to_canonical_bytes(&self) -> CodecResult<Vec<u8>> {
        self.to_json().map(String::into_bytes)
    }

    /// Parse a payload from JSON text
    ///
    /// Only the envelope is checked here; entity decoders validate `data`.
    ///
    /// # Errors
    /// - [`CodecError::Json`] for malformed JSON or a malformed fingerprint
    /// - [`CodecError::MissingField`] if an envelope field is absent
    pub fn from_json(json: &str) -> CodecResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        let object = value
            .as_object()
            .ok_or_else(|| CodecError::invalid_field("payload", "expected a JSON object"))?;
        for field in ["schema_version", "fingerprint", "data"] {
            if !object.contains_key(field) {
                return Err(CodecError::MissingField(field));
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a payload from bytes
    ///
    /// # Errors
    /// See [`Self::from_json`]; non-UTF-8 input is a [`CodecError::InvalidField`]
    pub fn from_bytes(bytes: &[u8]) -> CodecResult<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CodecError::invalid_field("payload", e.to_string()))?;
        Self::from_json(text)
    }

    /// Reject payloads written under another schema version
    ///
    /// # Errors
    /// Returns [`CodecError::UnsupportedSchema`]
    pub fn check_schema(&self) -> CodecResult<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(CodecError::UnsupportedSchema {
                found: self.schema_version.clone(),
                supported: SCHEMA_VERSION,
            });
        }
        Ok(())
    }
}
