//! Subscription lifecycle binding for store consumers.

mod binding;

pub use binding::Binding;
