use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::core::ResourceKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Clip,
    Mask,
    Pattern,
    Group,
}

impl ResourceKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Clip => "clip",
            Self::Mask => "mask",
            Self::Pattern => "pattern",
            Self::Group => "group",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Integer-keyed store for one resource kind.
///
/// Keys are handed out from a monotonically increasing counter. Explicit keys supplied by
/// the host are honoured verbatim and push the counter past them, so automatically assigned
/// keys never collide with explicit ones.
#[derive(Debug)]
pub struct ResourceCache<T> {
    kind: ResourceKind,
    entries: BTreeMap<i32, T>,
    next_key: i32,
}

impl<T> ResourceCache<T> {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            entries: BTreeMap::new(),
            next_key: 0,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The key the next automatic allocation will return.
    pub fn next_key(&self) -> ResourceKey {
        ResourceKey(self.next_key)
    }

    pub fn contains(&self, key: ResourceKey) -> bool {
        key.is_some() && self.entries.contains_key(&key.0)
    }

    pub fn get(&self, key: ResourceKey) -> Option<&T> {
        self.entries.get(&key.0)
    }

    pub fn get_mut(&mut self, key: ResourceKey) -> Option<&mut T> {
        self.entries.get_mut(&key.0)
    }

    /// Reserve a key for a new entry: the explicit key if given, else the counter.
    ///
    /// Returns [`ResourceKey::NONE`] for a negative explicit key.
    pub fn allocate_key(&mut self, requested: Option<ResourceKey>) -> ResourceKey {
        match requested {
            Some(key) if !key.is_some() => ResourceKey::NONE,
            Some(key) => {
                self.bump_past(key);
                key
            }
            None => {
                let key = ResourceKey(self.next_key);
                self.bump_past(key);
                key
            }
        }
    }

    fn bump_past(&mut self, key: ResourceKey) {
        self.next_key = self.next_key.max(key.0.saturating_add(1));
    }

    /// Store `value` under `key`, returning any previous payload.
    pub fn insert(&mut self, key: ResourceKey, value: T) -> Option<T> {
        if !key.is_some() {
            return None;
        }
        self.bump_past(key);
        self.entries.insert(key.0, value)
    }

    /// Release one entry, or every entry (resetting the counter) when `key` is `None`.
    ///
    /// Unknown keys are a no-op. Removed payloads are returned to the caller.
    pub fn release(&mut self, key: Option<ResourceKey>) -> Vec<T> {
        match key {
            None => self.release_all(),
            Some(key) => self.entries.remove(&key.0).into_iter().collect(),
        }
    }

    pub fn release_all(&mut self) -> Vec<T> {
        self.next_key = 0;
        std::mem::take(&mut self.entries).into_values().collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resource/cache.rs"]
mod tests;
