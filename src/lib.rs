//! # Cradle
//!
//! Scoped store injection with merge-based updates and synchronous change
//! notification.
//!
//! Cradle provides three pieces that together form the state backbone of a
//! tree-shaped application (a UI render tree, or any nested unit-of-work
//! hierarchy):
//!
//! ## Store (state holder)
//!
//! - [`Store<S>`](Store) - a shared handle to one piece of state, updated by
//!   shallow-merging patches (see [`Merge`]) and notifying subscribers in
//!   registration order
//! - [`Update<S>`](Update) - a tagged updater: a ready-made patch, or a
//!   derivation from the current state that may decline to change anything
//!
//! ## Registry (scoped injection)
//!
//! - [`Registry`] - an immutable snapshot mapping store identity to store
//!   handle; extending a scope copies the snapshot, so subtrees add or
//!   override stores without mutating ancestors
//! - [`StoreKey<S>`](StoreKey) - a typed key obtained from [`Store::key`],
//!   resolved against whichever scope is in hand
//!
//! ## Binding (observation)
//!
//! - [`Binding<S>`](Binding) - resolves a store once per activation,
//!   observes it for exactly the binding's lifetime, and exposes a revision
//!   counter (or calls a waker) once per accepted change
//!
//! # Example
//!
//! ```
//! use cradle::{Binding, Merge, Registry, Store};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Counter {
//!     count: i32,
//!     label: String,
//! }
//!
//! #[derive(Default)]
//! struct CounterPatch {
//!     count: Option<i32>,
//!     label: Option<String>,
//! }
//!
//! impl Merge for Counter {
//!     type Patch = CounterPatch;
//!
//!     fn merge(&self, patch: CounterPatch) -> Self {
//!         Counter {
//!             count: patch.count.unwrap_or(self.count),
//!             label: patch.label.unwrap_or_else(|| self.label.clone()),
//!         }
//!     }
//! }
//!
//! // Bootstrap: build the store, provide it to the root scope.
//! let counter = Store::new(Counter { count: 0, label: "clicks".into() });
//! let registry = Registry::new().provide(&counter);
//!
//! // A consumer somewhere down the tree observes it.
//! let binding = Binding::new(&registry, counter.key()).unwrap();
//!
//! counter.update(|c| {
//!     Some(CounterPatch { count: Some(c.count + 1), ..Default::default() })
//! });
//!
//! assert_eq!(binding.revision(), 1);
//! assert_eq!(binding.get().count, 1);
//! assert_eq!(binding.get().label, "clicks");
//! ```

pub mod observe;
pub mod registry;
pub mod store;

// Re-export main types for convenience
pub use observe::Binding;
pub use registry::{Registry, RegistryError, StoreKey};
pub use store::{ListenerId, Merge, Store, StoreId, Update};

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Toggle(bool);

    impl Merge for Toggle {
        type Patch = bool;

        fn merge(&self, patch: bool) -> Self {
            Toggle(patch)
        }
    }

    #[test]
    fn it_works() {
        // Basic smoke test
        let store = Store::new(Toggle(false));
        let registry = Registry::new().provide(&store);
        let resolved = registry.resolve(store.key()).unwrap();
        resolved.apply(true);
        assert_eq!(store.get(), Toggle(true));
    }
}
