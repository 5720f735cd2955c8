//! Identity seam shared by stores.

/// Something a store can key by identifier.
///
/// Equality of two entities with the same id is how stores decide whether an
/// update changes anything, so `Id` must be hashable and thread-safe.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync;

    fn id(&self) -> &Self::Id;
}
