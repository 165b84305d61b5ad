//! Scope registry: one container per scope key
//!
//! The registry is an explicitly owned object; applications create one at
//! bootstrap and hand it to whatever needs scoped containers. For code that
//! wants a process-wide registry instead, [`ScopeRegistry::global`] exposes
//! a lazily initialized shared instance.

use crate::metadata::DescriptorRegistry;
use crate::Container;
use ahash::RandomState;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::{TypeId, type_name};
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::debug;

/// Opaque scope identifier, built from a marker type.
///
/// ```rust
/// use wirebox::ScopeKey;
///
/// struct AppScope;
/// struct RequestScope;
///
/// assert_ne!(ScopeKey::of::<AppScope>(), ScopeKey::of::<RequestScope>());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScopeKey {
    id: TypeId,
    name: &'static str,
}

impl ScopeKey {
    /// Key for a marker type.
    #[inline]
    pub fn of<S: 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: type_name::<S>(),
        }
    }

    /// The marker type's fully qualified name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ScopeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ScopeKey {}

impl std::hash::Hash for ScopeKey {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope {}", self.name)
    }
}

/// Map from scope key to that scope's [`Container`].
///
/// Containers are created lazily on first access and live until the
/// registry is cleared or dropped. At most one container exists per
/// distinct key.
pub struct ScopeRegistry {
    metadata: Arc<DescriptorRegistry>,
    scopes: DashMap<ScopeKey, Container, RandomState>,
}

impl ScopeRegistry {
    /// Create a registry whose containers consult the given descriptors.
    #[inline]
    pub fn new(metadata: Arc<DescriptorRegistry>) -> Self {
        Self {
            metadata,
            scopes: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
        }
    }

    /// The lazily initialized process-wide registry, with its own
    /// descriptor registry. Prefer an owned [`ScopeRegistry`] where the
    /// bootstrap code can pass one around.
    pub fn global() -> &'static ScopeRegistry {
        static GLOBAL: Lazy<ScopeRegistry> =
            Lazy::new(|| ScopeRegistry::new(Arc::new(DescriptorRegistry::new())));
        &GLOBAL
    }

    /// The descriptor registry shared by this registry's containers.
    #[inline]
    pub fn metadata(&self) -> &Arc<DescriptorRegistry> {
        &self.metadata
    }

    /// The container for `key`, created empty on first access.
    /// Idempotent for the same key; never fails.
    pub fn get(&self, key: ScopeKey) -> Container {
        let container = self.scopes.entry(key).or_insert_with(|| {
            #[cfg(feature = "logging")]
            debug!(target: "wirebox", scope = key.name(), "Creating container for scope");

            Container::new(Arc::clone(&self.metadata))
        });
        container.value().clone()
    }

    /// Discard every container and its state.
    ///
    /// Test isolation only; production callers should never reset scopes.
    pub fn clear(&self) {
        #[cfg(feature = "logging")]
        debug!(
            target: "wirebox",
            scopes_removed = self.scopes.len(),
            "Clearing scope registry"
        );

        self.scopes.clear();
    }

    /// Number of live scopes.
    #[inline]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether no scope has been accessed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl std::fmt::Debug for ScopeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeRegistry")
            .field("scopes", &self.len())
            .field("declared_types", &self.metadata.len())
            .finish()
    }
}
