//! Durable key-value storage for the bridge's three state artifacts.
//!
//! Every read goes to the backing store; nothing is cached in memory
//! across ticks, so an external edit or a second process sees (and
//! produces) consistent state.

use crate::error::{BridgeError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The artifacts the bridge persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Canonical JSON of the last fetched schedule.
    ScheduleData,
    /// Hex digest of [`StoreKey::ScheduleData`].
    DataHash,
    /// RFC 3339 UTC time of the last successful fetch.
    LastFetchTime,
}

impl StoreKey {
    /// File name used by [`FileStore`].
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::ScheduleData => "schedule_data.json",
            Self::DataHash => "data_hash.txt",
            Self::LastFetchTime => "last_fetch_time.txt",
        }
    }
}

/// Get/put storage for raw bytes.
pub trait StateStore {
    /// Read the value for `key`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Store`] if the backing store cannot be read.
    fn get(&self, key: StoreKey) -> Result<Option<Vec<u8>>>;

    /// Replace the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Store`] if the value cannot be persisted.
    fn put(&self, key: StoreKey, value: &[u8]) -> Result<()>;
}

impl<S: StateStore + ?Sized> StateStore for &S {
    fn get(&self, key: StoreKey) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: StoreKey, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }
}

impl<S: StateStore + ?Sized> StateStore for std::sync::Arc<S> {
    fn get(&self, key: StoreKey) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn put(&self, key: StoreKey, value: &[u8]) -> Result<()> {
        (**self).put(key, value)
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store files under `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under the default state directory.
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(crate::bridge_dirs::state_dir())
    }

    /// Directory holding the state files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: StoreKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

impl StateStore for FileStore {
    fn get(&self, key: StoreKey) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BridgeError::Store(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    fn put(&self, key: StoreKey, value: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            BridgeError::Store(format!(
                "cannot create state directory {}: {e}",
                self.root.display()
            ))
        })?;

        // Write-then-rename so readers never observe a truncated file.
        let path = self.path_for(key);
        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, value).map_err(|e| {
            BridgeError::Store(format!("cannot write {}: {e}", tmp_path.display()))
        })?;
        std::fs::rename(&tmp_path, &path).map_err(|e| {
            BridgeError::Store(format!("cannot replace {}: {e}", path.display()))
        })?;
        Ok(())
    }
}

/// In-memory store, mainly for tests. Counts writes per key.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<StoreKey, Vec<u8>>,
    writes: HashMap<StoreKey, usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls made for `key`.
    #[must_use]
    pub fn write_count(&self, key: StoreKey) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.writes.get(&key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Total number of `put` calls across all keys.
    #[must_use]
    pub fn total_writes(&self) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.writes.values().sum())
            .unwrap_or(0)
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: StoreKey) -> Result<Option<Vec<u8>>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| BridgeError::Store("memory store lock poisoned".to_owned()))?;
        Ok(inner.values.get(&key).cloned())
    }

    fn put(&self, key: StoreKey, value: &[u8]) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| BridgeError::Store("memory store lock poisoned".to_owned()))?;
        inner.values.insert(key, value.to_vec());
        *inner.writes.entry(key).or_insert(0) += 1;
        Ok(())
    }
}
