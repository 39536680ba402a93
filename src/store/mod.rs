//! State holders with merge-based updates and synchronous notification.
//!
//! A [`Store`] holds one piece of application state. Updates arrive either
//! as ready-made patches or as derivations from the current state (see
//! [`Update`]); an accepted update shallow-merges into the state (see
//! [`Merge`]) and notifies every subscriber once, in registration order.

mod ident;
mod merge;
mod store;
mod update;

pub use ident::StoreId;
pub use merge::Merge;
pub use store::{ListenerId, Store};
pub use update::Update;
