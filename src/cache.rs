//! Per-scope state: the singleton cache and the binding table
//!
//! Both maps are DashMap-backed so concurrent provide/bind/resolve calls are
//! safe; duplicate detection uses the entry API, making check-then-insert an
//! atomic compare-and-insert. Entries are immutable once set and are never
//! removed except by whole-scope disposal.

use crate::metadata::TypeToken;
use ahash::RandomState;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Composite cache key: requested type identity plus optional qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    type_id: TypeId,
    qualifier: Option<String>,
}

impl CacheKey {
    #[inline]
    pub(crate) fn new(type_id: TypeId, qualifier: Option<&str>) -> Self {
        Self {
            type_id,
            qualifier: qualifier.map(str::to_owned),
        }
    }
}

/// A cached singleton: the type-erased value plus the concrete type name of
/// what is actually stored, kept for duplicate-provision diagnostics.
#[derive(Clone)]
pub(crate) struct CacheEntry {
    pub(crate) value: Arc<dyn Any + Send + Sync>,
    pub(crate) concrete: &'static str,
}

/// Singleton cache for one scope.
pub(crate) struct SingletonCache {
    entries: DashMap<CacheKey, CacheEntry, RandomState>,
}

impl SingletonCache {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
        }
    }

    /// Fast-path lookup.
    #[inline]
    pub(crate) fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Insert-if-absent. On conflict returns the concrete type name of the
    /// already-stored value; the stored entry is never overwritten.
    pub(crate) fn try_insert(&self, key: CacheKey, entry: CacheEntry) -> Result<(), &'static str> {
        match self.entries.entry(key) {
            Entry::Occupied(existing) => Err(existing.get().concrete),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Insert-if-absent, returning whatever ends up stored. Used for
    /// computed singletons, where a concurrent first writer wins.
    pub(crate) fn insert_or_get(&self, key: CacheKey, entry: CacheEntry) -> CacheEntry {
        match self.entries.entry(key) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(entry).clone(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Abstraction-to-implementation bindings for one scope.
pub(crate) struct BindingTable {
    entries: DashMap<TypeId, TypeToken, RandomState>,
}

impl BindingTable {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
        }
    }

    /// Insert-if-absent. On conflict returns the already-bound
    /// implementation; the original binding persists.
    pub(crate) fn try_insert(
        &self,
        abstraction: TypeToken,
        implementation: TypeToken,
    ) -> Result<(), TypeToken> {
        match self.entries.entry(abstraction.id()) {
            Entry::Occupied(existing) => Err(*existing.get()),
            Entry::Vacant(slot) => {
                slot.insert(implementation);
                Ok(())
            }
        }
    }

    #[inline]
    pub(crate) fn get(&self, abstraction: TypeToken) -> Option<TypeToken> {
        self.entries.get(&abstraction.id()).map(|t| *t)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
