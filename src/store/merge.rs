/// The shallow-merge contract between a state type and its patch type.
///
/// `merge` returns a new state in which every field the patch carries
/// overrides the corresponding top-level field, and every field the patch
/// omits is taken from `self` unchanged. Nested structures carried by a
/// patch replace the old value wholesale; nothing recurses.
///
/// A patch is typically a mirror struct with every field wrapped in
/// `Option`. Using `type Patch = Self` gives whole-value replacement
/// semantics instead.
///
/// # Examples
///
/// ```
/// use cradle::Merge;
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Settings {
///     volume: u8,
///     muted: bool,
/// }
///
/// #[derive(Default)]
/// struct SettingsPatch {
///     volume: Option<u8>,
///     muted: Option<bool>,
/// }
///
/// impl Merge for Settings {
///     type Patch = SettingsPatch;
///
///     fn merge(&self, patch: SettingsPatch) -> Self {
///         Settings {
///             volume: patch.volume.unwrap_or(self.volume),
///             muted: patch.muted.unwrap_or(self.muted),
///         }
///     }
/// }
///
/// let settings = Settings { volume: 7, muted: false };
/// let next = settings.merge(SettingsPatch { muted: Some(true), ..Default::default() });
/// assert_eq!(next, Settings { volume: 7, muted: true });
/// ```
pub trait Merge {
    /// The partial-update type accepted by [`merge`](Merge::merge).
    type Patch;

    /// Combine the current state with a patch, producing the next state.
    fn merge(&self, patch: Self::Patch) -> Self;
}
