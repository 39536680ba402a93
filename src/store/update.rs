use super::Merge;

/// A tagged updater: either a ready-made patch or a derivation from the
/// current state.
///
/// The derive form may return `None` to signal "no change"; the store treats
/// that as a silent no-op and fires no notifications. The value form always
/// carries a patch, so it cannot express "no change".
pub enum Update<S: Merge> {
    /// Merge this patch into the current state.
    Value(S::Patch),
    /// Compute a patch from the current state; `None` means no change.
    Derive(Box<dyn FnOnce(&S) -> Option<S::Patch>>),
}

impl<S: Merge> Update<S> {
    /// Wrap a patch-producing closure as a derive updater.
    pub fn derive<F>(f: F) -> Self
    where
        F: FnOnce(&S) -> Option<S::Patch> + 'static,
    {
        Update::Derive(Box::new(f))
    }

    /// Resolve the updater against the current state, yielding the candidate
    /// patch (or `None` for a no-op).
    pub(crate) fn candidate(self, current: &S) -> Option<S::Patch> {
        match self {
            Update::Value(patch) => Some(patch),
            Update::Derive(f) => f(current),
        }
    }
}
