//! Persistence identity for store-backed entities.
//!
//! # Invariants
//! - An entity is either `Unpersisted` or `Persisted(id)`; there is no third
//!   state encoded in a numeric sentinel.
//! - The state is decided at construction, on insertion, or when a stored row
//!   is decoded.

use serde::{Deserialize, Serialize};

/// Identifier assigned by a store on insertion.
pub type EntityId = i64;

/// Whether an entity has been written to a store yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceState {
    /// Created in memory, never inserted.
    #[default]
    Unpersisted,
    /// Stored under the given identifier.
    Persisted(EntityId),
}

impl PersistenceState {
    /// Decodes a raw, possibly missing or negative identifier.
    ///
    /// `None` and negative values mean the entity was never stored.
    pub fn from_raw_id(raw: Option<i64>) -> Self {
        match raw {
            Some(id) if id >= 0 => Self::Persisted(id),
            _ => Self::Unpersisted,
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        match self {
            Self::Unpersisted => None,
            Self::Persisted(id) => Some(*id),
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }
}

/// Capability of entities whose identity is owned by a store.
pub trait PersistenceEntity {
    fn persistence_state(&self) -> PersistenceState;

    /// Records the identifier generated by the store on insertion.
    fn mark_persisted(&mut self, id: EntityId);

    fn id(&self) -> Option<EntityId> {
        self.persistence_state().id()
    }
}
