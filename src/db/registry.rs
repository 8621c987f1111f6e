//! Named registry of live connection handles
//!
//! Every successful connect lands here under one or more logical names. A name
//! can be held by one entry only: the first registration wins and later ones
//! fail with [`ConnectorError::NameCollision`].

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::connection::BackendKind;
use super::error::{ConnectorError, Result};

/// Opaque, backend-specific connection handle
pub type Handle = Arc<dyn Any + Send + Sync>;

/// Whether an entry owns its connection or borrows its parent's
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Primary,
    /// Sub-resource of the primary registered under `parent`
    Alias { parent: String },
}

#[derive(Clone)]
pub struct Entry {
    pub kind: BackendKind,
    pub role: Role,
    pub handle: Handle,
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("kind", &self.kind)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` under `name`, keeping any existing entry on collision
    pub fn register(&self, name: impl Into<String>, entry: Entry) -> Result<()> {
        let name = name.into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&name) {
            return Err(ConnectorError::NameCollision(name));
        }
        entries.insert(name, entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Handle> {
        self.entry(name)
            .map(|entry| entry.handle)
            .ok_or_else(|| ConnectorError::NotFound(name.to_string()))
    }

    /// Look up a handle and downcast it to the driver type
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.get(name)?
            .downcast::<T>()
            .map_err(|_| ConnectorError::HandleMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn entry(&self, name: &str) -> Option<Entry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(name).cloned()
    }

    pub fn unregister(&self, name: &str) -> Option<Entry> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(name)
    }

    /// All registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return every entry whose role matches `select`
    fn drain_where(&self, select: impl Fn(&Role) -> bool) -> Vec<(String, Entry)> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let names: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| select(&entry.role))
            .map(|(name, _)| name.clone())
            .collect();
        names
            .into_iter()
            .filter_map(|name| entries.remove(&name).map(|entry| (name, entry)))
            .collect()
    }

    pub(crate) fn drain_aliases(&self) -> Vec<(String, Entry)> {
        self.drain_where(|role| matches!(role, Role::Alias { .. }))
    }

    pub(crate) fn drain_primaries(&self) -> Vec<(String, Entry)> {
        self.drain_where(|role| *role == Role::Primary)
    }
}
