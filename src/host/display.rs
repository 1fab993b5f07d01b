//! Display targets owned by the host application.
//!
//! The bridge only ever needs two things from a host: the names of the
//! text targets that currently exist, and a way to replace a target's text.

use crate::error::{BridgeError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File extension of [`FileHost`] targets.
const TARGET_EXTENSION: &str = "txt";

/// A host that owns named text targets.
pub trait DisplayHost {
    /// Names of the targets that currently exist, for configuration dropdowns.
    fn target_names(&self) -> Vec<String>;

    /// Replace the text shown by `target`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnknownTarget`] if no live target has this
    /// name. Other variants report host-side failures.
    fn write_text(&mut self, target: &str, text: &str) -> Result<()>;
}

/// One recorded [`DisplayHost::write_text`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWrite {
    pub target: String,
    pub text: String,
}

/// In-memory host with a fixed set of live targets.
///
/// Keeps the latest text per target and a log of every write.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    texts: BTreeMap<String, String>,
    writes: Vec<TextWrite>,
}

impl MemoryHost {
    /// A host whose live targets are `names`, all initially empty.
    pub fn with_targets<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: names
                .into_iter()
                .map(|n| (n.into(), String::new()))
                .collect(),
            writes: Vec::new(),
        }
    }

    /// Replace the set of live targets. Existing text is kept for targets
    /// that survive.
    pub fn set_targets<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut texts = BTreeMap::new();
        for name in names {
            let name = name.into();
            let text = self.texts.remove(&name).unwrap_or_default();
            texts.insert(name, text);
        }
        self.texts = texts;
    }

    /// Current text of `target`, if it exists.
    #[must_use]
    pub fn text(&self, target: &str) -> Option<&str> {
        self.texts.get(target).map(String::as_str)
    }

    /// Every successful write, oldest first.
    #[must_use]
    pub fn writes(&self) -> &[TextWrite] {
        &self.writes
    }

    /// Drain the write log.
    pub fn take_writes(&mut self) -> Vec<TextWrite> {
        std::mem::take(&mut self.writes)
    }
}

impl DisplayHost for MemoryHost {
    fn target_names(&self) -> Vec<String> {
        self.texts.keys().cloned().collect()
    }

    fn write_text(&mut self, target: &str, text: &str) -> Result<()> {
        let slot = self
            .texts
            .get_mut(target)
            .ok_or_else(|| BridgeError::UnknownTarget(target.to_owned()))?;
        text.clone_into(slot);
        self.writes.push(TextWrite {
            target: target.to_owned(),
            text: text.to_owned(),
        });
        Ok(())
    }
}

/// Host whose targets are `<name>.txt` files in one directory.
///
/// Streaming software can point a text source at these files. A target
/// exists only if its file exists; writing never creates new targets.
#[derive(Debug, Clone)]
pub struct FileHost {
    dir: PathBuf,
}

impl FileHost {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the target files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, target: &str) -> PathBuf {
        self.dir.join(format!("{target}.{TARGET_EXTENSION}"))
    }

    /// Create empty files for any of `names` that do not exist yet.
    /// Blank names are skipped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory or a file cannot be created.
    pub fn ensure_targets<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        for name in names.into_iter().filter(|n| !n.trim().is_empty()) {
            let path = self.path_for(name);
            if !path.exists() {
                std::fs::write(&path, "")?;
            }
        }
        Ok(())
    }
}

impl DisplayHost for FileHost {
    fn target_names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == TARGET_EXTENSION)
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_owned)
            })
            .collect();
        names.sort();
        names
    }

    fn write_text(&mut self, target: &str, text: &str) -> Result<()> {
        if target.trim().is_empty() || target.contains(['/', '\\']) {
            return Err(BridgeError::UnknownTarget(target.to_owned()));
        }
        let path = self.path_for(target);
        if !path.is_file() {
            return Err(BridgeError::UnknownTarget(target.to_owned()));
        }
        let tmp_path = path.with_extension("tmp");
        std::fs::write(&tmp_path, text).map_err(|e| {
            BridgeError::Host(format!("cannot write {}: {e}", tmp_path.display()))
        })?;
        std::fs::rename(&tmp_path, &path)
            .map_err(|e| BridgeError::Host(format!("cannot replace {}: {e}", path.display())))?;
        Ok(())
    }
}
