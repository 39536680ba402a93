use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::store::{Store, StoreId};

use super::RegistryError;

/// A typed registry key: a [`StoreId`] plus the state type it resolves to.
///
/// Obtained from [`Store::key`]. Keys are plain `Copy` values; two keys are
/// equal exactly when their ids are equal.
pub struct StoreKey<S> {
    id: StoreId,
    _state: PhantomData<fn() -> S>,
}

impl<S> StoreKey<S> {
    pub(crate) fn new(id: StoreId) -> Self {
        StoreKey {
            id,
            _state: PhantomData,
        }
    }

    /// The id this key resolves by.
    pub fn id(&self) -> StoreId {
        self.id
    }
}

// Manual impls: the derives would bound `S`, and keys must stay plain
// values for any state type.
impl<S> Clone for StoreKey<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for StoreKey<S> {}

impl<S> PartialEq for StoreKey<S> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S> Eq for StoreKey<S> {}

impl<S> Hash for StoreKey<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<S> fmt::Debug for StoreKey<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StoreKey").field(&self.id).finish()
    }
}

/// An immutable snapshot mapping store identity to store handle.
///
/// A registry is the scope a subtree of the application resolves its stores
/// from. Extending a registry copies it and overlays the new entries, so a
/// child scope can add or override stores without touching its parent:
/// siblings and ancestors keep resolving what they always did.
///
/// The root scope starts empty; application bootstrap provides its stores
/// and passes the resulting registry down the tree.
///
/// # Examples
///
/// ```
/// use cradle::{Merge, Registry, Store};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Theme {
///     dark: bool,
/// }
///
/// impl Merge for Theme {
///     type Patch = Theme;
///
///     fn merge(&self, patch: Theme) -> Self {
///         patch
///     }
/// }
///
/// let theme = Store::new(Theme { dark: false });
/// let root = Registry::new().provide(&theme);
///
/// // A child scope overrides the theme for its subtree only.
/// let dark_theme = Store::new(Theme { dark: true });
/// let child = root.provide_as(theme.key(), &dark_theme);
///
/// assert!(!root.resolve(theme.key()).unwrap().get().dark);
/// assert!(child.resolve(theme.key()).unwrap().get().dark);
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<StoreId, Arc<dyn Any + Send + Sync>>,
}

impl Registry {
    /// Create an empty root scope.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Extend this scope with a store, registered under its own key.
    ///
    /// Returns the child scope; `self` is untouched. Chained `provide` calls
    /// overlay left to right, so a later entry wins over an earlier one
    /// sharing the same id.
    #[must_use]
    pub fn provide<S>(&self, store: &Store<S>) -> Registry
    where
        S: Send + Sync + 'static,
    {
        self.bind(store.key(), store)
    }

    /// Extend this scope, binding `store` under someone else's key.
    ///
    /// Descendants resolving `key` get `store` instead of whatever an
    /// ancestor bound; handles already resolved from ancestor scopes keep
    /// pointing at the original.
    #[must_use]
    pub fn provide_as<S>(&self, key: StoreKey<S>, store: &Store<S>) -> Registry
    where
        S: Send + Sync + 'static,
    {
        self.bind(key, store)
    }

    fn bind<S>(&self, key: StoreKey<S>, store: &Store<S>) -> Registry
    where
        S: Send + Sync + 'static,
    {
        let mut entries = self.entries.clone();
        entries.insert(key.id(), Arc::new(store.clone()));
        debug!(key = %key.id(), store = %store.id(), entries = entries.len(), "scope extended");
        Registry { entries }
    }

    /// Resolve a store by key.
    ///
    /// Fails with [`RegistryError::MissingProvider`] when no enclosing scope
    /// provided the key. This is fatal to the caller's activation by design;
    /// a default store is never substituted.
    pub fn resolve<S>(&self, key: StoreKey<S>) -> Result<Store<S>, RegistryError>
    where
        S: Send + Sync + 'static,
    {
        let entry = self.entries.get(&key.id()).ok_or_else(|| {
            warn!(key = %key.id(), "resolve failed: no provider in scope");
            RegistryError::MissingProvider(key.id())
        })?;
        entry
            .downcast_ref::<Store<S>>()
            .cloned()
            .ok_or(RegistryError::TypeMismatch(key.id()))
    }

    /// Whether a provider exists for the key in this scope.
    pub fn contains<S>(&self, key: StoreKey<S>) -> bool {
        self.entries.contains_key(&key.id())
    }

    /// Number of stores visible from this scope.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this scope has no stores at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<StoreId> = self.entries.keys().copied().collect();
        ids.sort();
        f.debug_struct("Registry").field("ids", &ids).finish()
    }
}
