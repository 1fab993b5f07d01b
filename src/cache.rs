//! Change-detecting cache for the fetched schedule.
//!
//! The schedule is stored in a canonical form (sorted object keys, compact
//! JSON) alongside a SHA-256 digest of those bytes. A new document is only
//! written when its digest differs from the stored one or the stored bytes
//! no longer hash to it, so ticks that refetch an unchanged feed never write
//! to the disk.

use crate::error::{BridgeError, Result};
use crate::store::{StateStore, StoreKey};
use schedule_feed::ScheduleDocument;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Canonical serialization of a schedule: object keys sorted, no whitespace.
///
/// # Errors
///
/// Returns [`BridgeError::Store`] if the document cannot be serialized.
pub fn canonical_json(document: &ScheduleDocument) -> Result<Vec<u8>> {
    let value = serde_json::to_value(document)
        .map_err(|e| BridgeError::Store(format!("cannot canonicalize schedule: {e}")))?;
    serde_json::to_vec(&sort_keys(value))
        .map_err(|e| BridgeError::Store(format!("cannot serialize schedule: {e}")))
}

/// Rebuild every object with its keys in sorted order. Holds whether or not
/// `serde_json` was built with `preserve_order`.
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Content cache over a [`StateStore`].
#[derive(Debug)]
pub struct ContentCache<S> {
    store: S,
}

impl<S: StateStore> ContentCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `document` if it differs from what is stored.
    ///
    /// Returns `true` when a write happened. The document is written before
    /// its digest: if the process dies in between, the old digest no longer
    /// matches and the next fetch rewrites both.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Store`] if the store cannot be read or written.
    pub fn store_if_changed(&self, document: &ScheduleDocument) -> Result<bool> {
        let canonical = canonical_json(document)?;
        let digest = digest_hex(&canonical);

        if self.holds(&digest)? {
            tracing::debug!(digest = %digest, "schedule unchanged; skipping write");
            return Ok(false);
        }

        self.store.put(StoreKey::ScheduleData, &canonical)?;
        self.store.put(StoreKey::DataHash, digest.as_bytes())?;
        tracing::info!(digest = %digest, days = document.days.len(), "cached updated schedule");
        Ok(true)
    }

    /// Returns `true` if both the stored digest and the stored document
    /// match `digest`. A digest whose document is missing or was replaced
    /// does not count.
    fn holds(&self, digest: &str) -> Result<bool> {
        if self.stored_digest()?.as_deref() != Some(digest) {
            return Ok(false);
        }
        Ok(self
            .store
            .get(StoreKey::ScheduleData)?
            .is_some_and(|bytes| digest_hex(&bytes) == digest))
    }

    /// Read the last persisted schedule.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] if nothing has been cached yet, or
    /// [`BridgeError::Store`] if the cached bytes cannot be decoded.
    pub fn load(&self) -> Result<ScheduleDocument> {
        let bytes = self.store.get(StoreKey::ScheduleData)?.ok_or_else(|| {
            BridgeError::NotFound("no cached schedule; no fetch has succeeded yet".to_owned())
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| BridgeError::Store(format!("cached schedule is corrupt: {e}")))
    }

    /// The persisted digest, if any.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Store`] if the store cannot be read.
    pub fn stored_digest(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(StoreKey::DataHash)?
            .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_owned()))
    }
}
