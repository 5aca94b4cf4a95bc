//! Entities: records that keep their identity while their contents change.

/// Anything persisted with a stable identifier (users, roles).
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// Two entities are the same record when their ids match, whatever else differs.
    fn same_entity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
