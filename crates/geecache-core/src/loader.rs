//! Loaders: the source of truth a group falls back to on a cache miss.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context};

use crate::error::{CacheError, CacheResult};

/// Loads the canonical bytes for a key.
///
/// Implementations may block (disk, database, downstream service). Errors
/// are passed through to the caller of [`crate::Group::get`] untouched.
pub trait Loader: Send + Sync {
    fn load(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F> Loader for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync,
{
    fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self(key)
    }
}

/// In-memory source of truth.
#[derive(Debug, Clone, Default)]
pub struct MapLoader {
    entries: HashMap<String, Vec<u8>>,
}

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style.
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Read a flat YAML mapping of `key: value` strings.
    pub fn from_yaml_file(path: &Path) -> CacheResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CacheError::Config {
            message: format!("failed to read source {}: {}", path.display(), e),
        })?;
        let raw: HashMap<String, serde_yaml::Value> =
            serde_yaml::from_str(&content).map_err(|e| CacheError::Config {
                message: format!("failed to parse source {}: {}", path.display(), e),
            })?;

        let mut entries = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let text = match value {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                _ => {
                    return Err(CacheError::config(format!(
                        "source {}: value for {key:?} must be a scalar",
                        path.display()
                    )))
                }
            };
            entries.insert(key, text.into_bytes());
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Loader for MapLoader {
    fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        match self.entries.get(key) {
            Some(value) => Ok(value.clone()),
            None => bail!("{key} not exist"),
        }
    }
}

/// Serves each key from the file of the same relative path under `root`.
#[derive(Debug, Clone)]
pub struct DirLoader {
    root: PathBuf,
}

impl DirLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(key);
        // Keys come from the network; never let one climb out of the root.
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            bail!("key {key:?} escapes source directory");
        }
        Ok(self.root.join(relative))
    }
}

impl Loader for DirLoader {
    fn load(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.resolve(key)?;
        std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}
