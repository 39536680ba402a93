//! Scoped store injection.
//!
//! A [`Registry`] is an immutable snapshot mapping store identity to store
//! handle. Extending a scope copies the snapshot and overlays new entries,
//! so a subtree can add or override stores without mutating its ancestors.
//! Registries are passed down the tree explicitly; there is no ambient
//! current scope.

mod error;
mod registry;

pub use error::RegistryError;
pub use registry::{Registry, StoreKey};
