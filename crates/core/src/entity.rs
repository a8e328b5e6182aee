//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Records handed out by the record store are entities: two snapshots with the
/// same id describe the same item, even when every other field differs.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
