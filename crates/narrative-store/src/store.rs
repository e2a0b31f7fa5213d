//! Durable content-addressed store
//!
//! One canonical JSON file per fingerprint, `{root}/{fingerprint}.json`.
//! Writes go to a temporary file in the same directory and are published by
//! an atomic rename, so readers never observe a partial record. A crashed
//! writer leaves at most an orphaned `.cas_*.tmp` file, which
//! [`ContentAddressedStore::sweep_temporaries`] removes.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use narrative_codec::{CodecError, SerializedPayload};
use narrative_model::Fingerprint;
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};

const RECORD_SUFFIX: &str = ".json";
const TEMP_PREFIX: &str = ".cas_";
const TEMP_SUFFIX: &str = ".tmp";

/// Fingerprint-keyed payload files under one directory
///
/// Safe to share between threads and processes: concurrent writers of the
/// same fingerprint write identical bytes, and the rename makes one complete
/// write win.
#[derive(Debug, Clone)]
pub struct ContentAddressedStore {
    root: PathBuf,
}

impl ContentAddressedStore {
    /// Open a store, creating the root directory if needed
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the directory cannot be created
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StoreError::io_error(&root, e))?;
        Ok(Self { root })
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parse a record name supplied as text
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidFingerprint`] unless `text` is a
    /// lowercase hex fingerprint
    pub fn parse_fingerprint(text: &str) -> StoreResult<Fingerprint> {
        text.parse()
            .map_err(|_| StoreError::InvalidFingerprint(text.to_string()))
    }

    /// Path of the record for `fingerprint`
    #[must_use]
    pub fn path_for(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root.join(format!("{fingerprint}{RECORD_SUFFIX}"))
    }

    /// Persist `payload` under its fingerprint
    ///
    /// Idempotent: an existing record is left untouched.
    ///
    /// # Errors
    /// - [`StoreError::Codec`] if the payload cannot be encoded
    /// - [`StoreError::Io`] / [`StoreError::Persist`] on filesystem failure;
    ///   the temporary file is removed before returning
    pub fn store(&self, payload: &SerializedPayload) -> StoreResult<Fingerprint> {
        let fingerprint = payload.fingerprint;
        let target = self.path_for(&fingerprint);
        if target.is_file() {
            debug!(%fingerprint, "record already stored");
            return Ok(fingerprint);
        }

        let bytes = payload.to_canonical_bytes()?;
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.root)
            .map_err(|e| StoreError::io_error(&self.root, e))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io_error(tmp.path(), e))?;
        tmp.persist(&target).map_err(|e| StoreError::Persist {
            path: target.clone(),
            source: e.error,
        })?;

        info!(%fingerprint, bytes = bytes.len(), "stored payload");
        Ok(fingerprint)
    }

    /// Read the record for `fingerprint`
    ///
    /// # Errors
    /// - [`StoreError::Io`] for read failures other than absence
    /// - [`StoreError::Codec`] if the record is corrupt or names another
    ///   fingerprint
    pub fn load(&self, fingerprint: &Fingerprint) -> StoreResult<Option<SerializedPayload>> {
        let path = self.path_for(fingerprint);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io_error(path, e)),
        };

        let payload = SerializedPayload::from_bytes(&bytes)?;
        if payload.fingerprint != *fingerprint {
            warn!(
                path = %path.display(),
                found = %payload.fingerprint,
                "record holds a different fingerprint"
            );
            return Err(CodecError::FingerprintMismatch {
                expected: *fingerprint,
                actual: payload.fingerprint,
            }
            .into());
        }
        Ok(Some(payload))
    }

    /// Whether a record exists
    #[must_use]
    pub fn exists(&self, fingerprint: &Fingerprint) -> bool {
        self.path_for(fingerprint).is_file()
    }

    /// Delete the record, reporting whether one existed
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] for failures other than absence
    pub fn invalidate(&self, fingerprint: &Fingerprint) -> StoreResult<bool> {
        let path = self.path_for(fingerprint);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(%fingerprint, "invalidated stored payload");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io_error(path, e)),
        }
    }

    /// Fingerprints of all stored records, sorted
    ///
    /// Files whose names are not `{fingerprint}.json` are ignored.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if the directory cannot be listed
    pub fn fingerprints(&self) -> StoreResult<Vec<Fingerprint>> {
        let mut found: Vec<Fingerprint> = self
            .file_names()?
            .iter()
            .filter_map(|name| name.strip_suffix(RECORD_SUFFIX))
            .filter_map(|stem| stem.parse().ok())
            .collect();
        found.sort_unstable();
        Ok(found)
    }

    /// Delete every record, returning how many were removed
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] on the first failed deletion
    pub fn clear(&self) -> StoreResult<usize> {
        let mut removed = 0;
        for fingerprint in self.fingerprints()? {
            if self.invalidate(&fingerprint)? {
                removed += 1;
            }
        }
        info!(removed, "cleared store");
        Ok(removed)
    }

    /// Remove temporary files orphaned by interrupted writers
    ///
    /// Must not run while writers are active: an in-flight temporary file is
    /// indistinguishable from an orphan.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] if a file cannot be removed
    pub fn sweep_temporaries(&self) -> StoreResult<usize> {
        let mut removed = 0;
        for name in self.file_names()? {
            if !(name.starts_with(TEMP_PREFIX) && name.ends_with(TEMP_SUFFIX)) {
                continue;
            }
            let path = self.root.join(&name);
            match fs::remove_file(&path) {
                Ok(()) => {
                    warn!(path = %path.display(), "removed orphaned temporary file");
                    removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(StoreError::io_error(path, e)),
            }
        }
        Ok(removed)
    }

    fn file_names(&self) -> StoreResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::io_error(&self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io_error(&self.root, e))?;
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }
}
