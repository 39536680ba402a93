use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, trace};

use crate::registry::StoreKey;

use super::{Merge, StoreId, Update};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
///
/// Every subscription gets its own id, even when the same closure is
/// registered twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Inner<S> {
    id: StoreId,
    state: RwLock<S>,
    // Insertion order is notification order; duplicates are allowed.
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    next_listener: AtomicU64,
    // Set while a notification cycle is running; reentrant updates panic.
    notifying: AtomicBool,
}

/// A shared holder of one piece of application state.
///
/// Updates are merge-based: an accepted patch is shallow-merged into the
/// current state (see [`Merge`]) and every subscriber is then invoked once,
/// synchronously, in registration order. Cloning a `Store` clones the
/// handle, not the state; all clones observe the same state and the same
/// subscriber list.
///
/// Stores are built once at application setup and live for the process
/// lifetime; subscribers come and go as consumers activate and deactivate.
///
/// # Examples
///
/// ```
/// use cradle::{Merge, Store};
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
/// let store = Store::new(Counter { count: 0 });
/// store.update(|c| Some(c.count + 1));
/// store.update(|c| (c.count < 1).then_some(c.count + 1)); // declined, no-op
/// assert_eq!(store.get(), Counter { count: 1 });
/// ```
pub struct Store<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Store {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Store<S> {
    /// Create a new store with the given initial state.
    ///
    /// The store is assigned the next process-unique [`StoreId`].
    pub fn new(initial: S) -> Self {
        let id = StoreId::next();
        debug!(%id, "store created");
        Store {
            inner: Arc::new(Inner {
                id,
                state: RwLock::new(initial),
                listeners: RwLock::new(Vec::new()),
                next_listener: AtomicU64::new(0),
                notifying: AtomicBool::new(false),
            }),
        }
    }

    /// The store's process-unique identity.
    pub fn id(&self) -> StoreId {
        self.inner.id
    }

    /// The typed registry key for this store.
    pub fn key(&self) -> StoreKey<S> {
        StoreKey::new(self.inner.id)
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> S
    where
        S: Clone,
    {
        self.inner.state.read().unwrap().clone()
    }

    /// Read the current state without cloning.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let state = self.inner.state.read().unwrap();
        f(&state)
    }

    /// Subscribe to state changes.
    ///
    /// The listener is appended to the notification list; it will run once
    /// per accepted update, after every listener registered before it. No
    /// duplicate detection is performed.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .write()
            .unwrap()
            .push((id, Arc::new(listener)));
        trace!(store = %self.inner.id, listener = id.0, "listener subscribed");
        id
    }

    /// Remove a previously registered listener.
    ///
    /// No-op when the id is not (or no longer) registered. Unsubscribing
    /// during a notification cycle is allowed; the in-flight cycle still
    /// runs against the snapshot it started with.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.inner
            .listeners
            .write()
            .unwrap()
            .retain(|(lid, _)| *lid != id);
        trace!(store = %self.inner.id, listener = id.0, "listener unsubscribed");
    }

    /// Number of currently registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.read().unwrap().len()
    }
}

impl<S: Merge> Store<S> {
    /// Apply a tagged [`Update`].
    ///
    /// The value form always merges; the derive form may return `None`, in
    /// which case the state is untouched and no listener runs. After an
    /// accepted merge, every listener registered at that moment is invoked
    /// exactly once, in registration order, synchronously.
    ///
    /// # Panics
    ///
    /// Panics when called from inside one of this store's own notification
    /// cycles. A panicking listener propagates to the caller and aborts the
    /// remaining notifications for that cycle; the store itself stays
    /// usable.
    pub fn dispatch(&self, update: Update<S>) {
        match update {
            Update::Value(patch) => self.merge_with(move |_| Some(patch)),
            Update::Derive(f) => self.merge_with(f),
        }
    }

    /// Merge a patch into the current state and notify subscribers.
    ///
    /// Shorthand for `dispatch(Update::Value(patch))`.
    pub fn apply(&self, patch: S::Patch) {
        self.merge_with(move |_| Some(patch));
    }

    /// Derive a patch from the current state, then merge and notify.
    ///
    /// Returning `None` declines the update: the state is untouched and no
    /// listener runs. The closure observes the state under its lock, so it
    /// must not call back into this store.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&S) -> Option<S::Patch>,
    {
        self.merge_with(f);
    }

    fn merge_with<F>(&self, produce: F)
    where
        F: FnOnce(&S) -> Option<S::Patch>,
    {
        if self.inner.notifying.load(Ordering::Acquire) {
            panic!(
                "reentrant update on {}: listeners must not update their own store",
                self.inner.id
            );
        }

        let snapshot: Vec<Listener> = {
            let mut state = self.inner.state.write().unwrap();
            let Some(patch) = produce(&state) else {
                trace!(store = %self.inner.id, "update declined, state unchanged");
                return;
            };
            let next = state.merge(patch);
            *state = next;
            drop(state);

            // Snapshot before iterating so listeners may unsubscribe freely.
            self.inner
                .listeners
                .read()
                .unwrap()
                .iter()
                .map(|(_, l)| Arc::clone(l))
                .collect()
        };

        trace!(store = %self.inner.id, listeners = snapshot.len(), "update accepted");

        self.inner.notifying.store(true, Ordering::Release);
        let _reset = NotifyGuard(&self.inner.notifying);
        for listener in snapshot {
            listener();
        }
    }
}

impl<S> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.inner.id)
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

// Clears the in-notification flag even when a listener panics, so a caught
// panic does not wedge the store.
struct NotifyGuard<'a>(&'a AtomicBool);

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    struct AppState {
        count: usize,
        name: String,
    }

    #[derive(Default)]
    struct AppPatch {
        count: Option<usize>,
        name: Option<String>,
    }

    impl Merge for AppState {
        type Patch = AppPatch;

        fn merge(&self, patch: AppPatch) -> Self {
            AppState {
                count: patch.count.unwrap_or(self.count),
                name: patch.name.unwrap_or_else(|| self.name.clone()),
            }
        }
    }

    fn test_store() -> Store<AppState> {
        Store::new(AppState {
            count: 0,
            name: "test".to_string(),
        })
    }

    #[test]
    fn apply_shallow_merges() {
        let store = test_store();

        store.apply(AppPatch {
            count: Some(42),
            ..Default::default()
        });

        assert_eq!(store.get().count, 42);
        assert_eq!(store.get().name, "test");
    }

    #[test]
    fn update_derives_from_current_state() {
        let store = test_store();

        store.update(|state| {
            Some(AppPatch {
                count: Some(state.count + 10),
                ..Default::default()
            })
        });

        assert_eq!(store.get().count, 10);
    }

    #[test]
    fn declined_update_is_silent() {
        let store = test_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        store.subscribe(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.update(|_| None);

        assert_eq!(store.get().count, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscribers_run_once_per_accepted_update() {
        let store = test_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        store.subscribe(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);

        store.apply(AppPatch {
            count: Some(1),
            ..Default::default()
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        store.apply(AppPatch {
            count: Some(2),
            ..Default::default()
        });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribed_listener_never_runs() {
        let store = test_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let id = store.subscribe(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        store.unsubscribe(id);

        store.apply(AppPatch {
            count: Some(1),
            ..Default::default()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let store = test_store();
        let order = Arc::new(RwLock::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            store.subscribe(move || {
                order.write().unwrap().push(tag);
            });
        }

        store.apply(AppPatch {
            count: Some(1),
            ..Default::default()
        });

        assert_eq!(*order.read().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn duplicate_subscriptions_fire_twice() {
        let store = test_store();
        let calls = Arc::new(AtomicUsize::new(0));

        let listener = {
            let calls = Arc::clone(&calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
            }
        };
        let first = store.subscribe(listener.clone());
        let second = store.subscribe(listener);
        assert_ne!(first, second);

        store.apply(AppPatch {
            count: Some(1),
            ..Default::default()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe_during_notification_keeps_snapshot() {
        let store = Store::new(AppState {
            count: 0,
            name: "test".to_string(),
        });
        let calls = Arc::new(AtomicUsize::new(0));

        // The first listener removes the second; the snapshot taken at
        // dispatch time still runs both for this cycle.
        let second_id = Arc::new(RwLock::new(None::<ListenerId>));
        {
            let store = store.clone();
            let second_id = Arc::clone(&second_id);
            store.clone().subscribe(move || {
                if let Some(id) = *second_id.read().unwrap() {
                    store.unsubscribe(id);
                }
            });
        }
        {
            let calls = Arc::clone(&calls);
            let id = store.subscribe(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            });
            *second_id.write().unwrap() = Some(id);
        }

        store.apply(AppPatch {
            count: Some(1),
            ..Default::default()
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Gone for the next cycle.
        store.apply(AppPatch {
            count: Some(2),
            ..Default::default()
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reentrant_update_panics_and_store_survives() {
        let store = test_store();
        {
            let store = store.clone();
            store.clone().subscribe(move || {
                store.apply(AppPatch {
                    count: Some(99),
                    ..Default::default()
                });
            });
        }

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.apply(AppPatch {
                count: Some(1),
                ..Default::default()
            });
        }));
        assert!(result.is_err());

        // The merge itself landed and the store is not wedged.
        assert_eq!(store.get().count, 1);
        store.subscribe(|| {});
        assert_eq!(store.subscriber_count(), 2);
    }
}
