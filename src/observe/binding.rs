use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::registry::{Registry, RegistryError, StoreKey};
use crate::store::{ListenerId, Store};

/// Binds one consumer to one store for exactly the binding's lifetime.
///
/// On construction the store is resolved from the registry once and a
/// listener is subscribed; the listener bumps an internal revision counter
/// exactly once per accepted change (and invokes the waker, when one was
/// given). Dropping the binding unsubscribes that same listener, so
/// activation and deactivation stay symmetric and nothing leaks.
///
/// Consumers poll [`revision`](Binding::revision) (or react to their waker)
/// to decide when to re-read state; the binding never re-resolves and never
/// re-subscribes across re-reads.
///
/// # Examples
///
/// ```
/// use cradle::{Binding, Merge, Registry, Store};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Counter {
///     count: i32,
/// }
///
/// impl Merge for Counter {
///     type Patch = i32;
///
///     fn merge(&self, count: i32) -> Self {
///         Counter { count }
///     }
/// }
///
/// let counter = Store::new(Counter { count: 0 });
/// let registry = Registry::new().provide(&counter);
///
/// let binding = Binding::new(&registry, counter.key()).unwrap();
/// assert_eq!(binding.revision(), 0);
///
/// counter.apply(1);
/// assert_eq!(binding.revision(), 1);
/// assert_eq!(binding.get().count, 1);
///
/// drop(binding);
/// assert_eq!(counter.subscriber_count(), 0);
/// ```
pub struct Binding<S> {
    store: Store<S>,
    listener: ListenerId,
    revision: Arc<AtomicU64>,
}

impl<S: Send + Sync + 'static> Binding<S> {
    /// Resolve `key` from `registry` and start observing the store.
    ///
    /// Fails with the registry's missing-provider error when no enclosing
    /// scope provided the key; an activation must not proceed without its
    /// store.
    pub fn new(registry: &Registry, key: StoreKey<S>) -> Result<Self, RegistryError> {
        Self::bind(registry, key, None)
    }

    /// Like [`new`](Binding::new), but also invokes `waker` once per
    /// accepted change — the hook a consumer uses to schedule its own
    /// re-evaluation.
    ///
    /// The waker runs inside the store's notification cycle, so it must not
    /// update the store it observes.
    pub fn with_waker<F>(
        registry: &Registry,
        key: StoreKey<S>,
        waker: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::bind(registry, key, Some(Arc::new(waker)))
    }

    fn bind(
        registry: &Registry,
        key: StoreKey<S>,
        waker: Option<Arc<dyn Fn() + Send + Sync>>,
    ) -> Result<Self, RegistryError> {
        let store = registry.resolve(key)?;
        let revision = Arc::new(AtomicU64::new(0));
        let listener = {
            let revision = Arc::clone(&revision);
            store.subscribe(move || {
                revision.fetch_add(1, Ordering::Release);
                if let Some(waker) = &waker {
                    waker();
                }
            })
        };
        Ok(Binding {
            store,
            listener,
            revision,
        })
    }
}

impl<S> Binding<S> {
    /// The resolved store — possibly a scope override, not the instance the
    /// key came from.
    pub fn store(&self) -> &Store<S> {
        &self.store
    }

    /// Number of accepted changes observed since activation.
    ///
    /// Strictly increases by one per notification; compare against a
    /// remembered value to decide whether to re-evaluate.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Get a clone of the observed store's current state.
    pub fn get(&self) -> S
    where
        S: Clone,
    {
        self.store.get()
    }

    /// Read the observed store's state without cloning.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        self.store.read(f)
    }
}

impl<S> Drop for Binding<S> {
    fn drop(&mut self) {
        self.store.unsubscribe(self.listener);
    }
}

impl<S> fmt::Debug for Binding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("store", &self.store.id())
            .field("revision", &self.revision())
            .finish()
    }
}
