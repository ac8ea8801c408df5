//! Name -> group directory.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::error::{CacheError, CacheResult};
use crate::group::Group;
use crate::loader::Loader;

/// Directory of groups, shared by group owners and the transport.
///
/// Lookups take a shared lock and run in parallel; creation is exclusive.
#[derive(Debug, Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a group, replacing any group with the same name.
    pub fn create_group<L>(
        &self,
        name: impl Into<String>,
        cache_bytes: usize,
        loader: L,
    ) -> Arc<Group>
    where
        L: Loader + 'static,
    {
        self.insert(name.into(), cache_bytes, Arc::new(loader))
    }

    /// Start building a group whose loader is wired in at runtime.
    pub fn builder(&self, name: impl Into<String>) -> GroupBuilder<'_> {
        GroupBuilder {
            registry: self,
            name: name.into(),
            cache_bytes: 0,
            loader: None,
        }
    }

    /// Look up a group. Never creates one.
    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups
            .read()
            .expect("registry lock poisoned")
            .get(name)
            .cloned()
    }

    /// Registered group names, sorted.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .read()
            .expect("registry lock poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn insert(&self, name: String, cache_bytes: usize, loader: Arc<dyn Loader>) -> Arc<Group> {
        let group = Arc::new(Group::new(name.clone(), cache_bytes, loader));
        let previous = self
            .groups
            .write()
            .expect("registry lock poisoned")
            .insert(name.clone(), Arc::clone(&group));

        if previous.is_some() {
            warn!(group = %name, "replaced existing group");
        } else {
            info!(group = %name, cache_bytes, "created group");
        }
        group
    }
}

/// Builder for a group whose loader may be missing until runtime.
#[must_use]
pub struct GroupBuilder<'a> {
    registry: &'a Registry,
    name: String,
    cache_bytes: usize,
    loader: Option<Arc<dyn Loader>>,
}

impl GroupBuilder<'_> {
    /// Byte budget (0 = unbounded).
    pub fn cache_bytes(mut self, cache_bytes: usize) -> Self {
        self.cache_bytes = cache_bytes;
        self
    }

    pub fn loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Register the group. Fails without touching the registry if no loader was set.
    pub fn register(self) -> CacheResult<Arc<Group>> {
        let Some(loader) = self.loader else {
            return Err(CacheError::Config {
                message: format!("group {:?} has no loader", self.name),
            });
        };
        Ok(self.registry.insert(self.name, self.cache_bytes, loader))
    }
}
