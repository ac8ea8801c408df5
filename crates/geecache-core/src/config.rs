//! Node configuration.
//!
//! ```yaml
//! addr: 127.0.0.1:9999
//! base_path: /_geecache/
//! groups:
//!   - name: scores
//!     cache_bytes: 2048
//!     source: { kind: map, path: ./scores.yaml }
//!   - name: blobs
//!     cache_bytes: 1048576
//!     source: { kind: dir, path: ./blobs }
//! ```
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `GEECACHE_ADDR` | Listen address (default: `127.0.0.1:9999`) |
//! | `GEECACHE_BASE_PATH` | Request prefix (default: `/_geecache/`) |

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{CacheError, CacheResult};
use crate::http::{validate_base_path, DEFAULT_BASE_PATH};
use crate::loader::{DirLoader, Loader, MapLoader};
use crate::registry::Registry;

/// Where a group loads from on a miss.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Flat YAML `key: value` file, read once at startup.
    Map { path: PathBuf },
    /// One file per key under a directory, read on every miss.
    Dir { path: PathBuf },
}

impl SourceConfig {
    /// Build the loader. Relative paths resolve against `base_dir`.
    pub fn build_loader(&self, base_dir: &Path) -> CacheResult<Arc<dyn Loader>> {
        let loader: Arc<dyn Loader> = match self {
            Self::Map { path } => Arc::new(MapLoader::from_yaml_file(&base_dir.join(path))?),
            Self::Dir { path } => Arc::new(DirLoader::new(base_dir.join(path))),
        };
        Ok(loader)
    }
}

/// One cache group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupConfig {
    pub name: String,

    /// Byte budget; 0 means unbounded.
    #[serde(default = "default_cache_bytes")]
    pub cache_bytes: usize,

    /// Loader source. A group without one is rejected when wiring the registry.
    #[serde(default)]
    pub source: Option<SourceConfig>,
}

/// Cache node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeConfig {
    /// Listen address.
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Request prefix.
    #[serde(default = "default_base_path")]
    pub base_path: String,

    #[serde(default)]
    pub groups: Vec<GroupConfig>,

    /// Directory relative source paths resolve against. Set by [`NodeConfig::load`].
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_addr() -> String {
    "127.0.0.1:9999".to_string()
}

fn default_base_path() -> String {
    DEFAULT_BASE_PATH.to_string()
}

fn default_cache_bytes() -> usize {
    2 << 10
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            base_path: default_base_path(),
            groups: Vec::new(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl NodeConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: &Path) -> CacheResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CacheError::Config {
            message: format!("failed to read config {}: {}", path.display(), e),
        })?;
        let mut config: NodeConfig =
            serde_yaml::from_str(&content).map_err(|e| CacheError::Config {
                message: format!("failed to parse config {}: {}", path.display(), e),
            })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        config.validate()?;
        Ok(config)
    }

    /// Apply `GEECACHE_*` environment overrides on top of the file values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(addr) = std::env::var("GEECACHE_ADDR") {
            self.addr = addr;
        }
        if let Ok(base_path) = std::env::var("GEECACHE_BASE_PATH") {
            self.base_path = base_path;
        }
        self
    }

    pub fn validate(&self) -> CacheResult<()> {
        validate_base_path(&self.base_path)?;

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.name.is_empty() || group.name.contains('/') {
                return Err(CacheError::config(format!(
                    "invalid group name {:?}: must be non-empty and contain no '/'",
                    group.name
                )));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(CacheError::config(format!(
                    "duplicate group name {:?}",
                    group.name
                )));
            }
        }
        Ok(())
    }

    /// Create every configured group in a fresh registry.
    ///
    /// Loaders are all built before the first group is registered, so a bad
    /// source leaves nothing half-wired.
    pub fn build_registry(&self) -> CacheResult<Registry> {
        self.validate()?;

        let mut loaders = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let source = group.source.as_ref().ok_or_else(|| {
                CacheError::config(format!("group {:?} has no source", group.name))
            })?;
            loaders.push(source.build_loader(&self.base_dir)?);
        }

        let registry = Registry::new();
        for (group, loader) in self.groups.iter().zip(loaders) {
            registry
                .builder(group.name.as_str())
                .cache_bytes(group.cache_bytes)
                .loader(loader)
                .register()?;
        }
        Ok(registry)
    }
}
