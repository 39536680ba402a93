use thiserror::Error;

use crate::store::StoreId;

/// Failures when resolving a store from a [`Registry`](super::Registry).
///
/// Both variants are programming errors: the fix is to register the store in
/// an enclosing scope (or with the right key), not to handle the error at
/// the resolution site. Resolution never substitutes a default store.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The key was never provided by this scope or any ancestor.
    #[error("no provider for {0}: register the store in an enclosing scope before resolving it")]
    MissingProvider(StoreId),

    /// An entry exists under this id but holds a different state type.
    /// Keys are typed and ids are process-unique, so this should never
    /// happen; the variant exists so a downcast failure surfaces instead of
    /// panicking.
    #[error("provider for {0} holds a different state type than the resolving key")]
    TypeMismatch(StoreId),
}
