//! Store-agnostic value types shared by every repository implementation.
//!
//! # Responsibility
//! - Describe what to fetch (`QueryData`), which window to fetch
//!   (`PaginationData`) and whether an entity already lives in a store
//!   (`PersistenceState`).
//!
//! # Invariants
//! - Page numbering is 1-based and page sizes are never zero.
//! - Query parameter keys are unique and never blank.
//! - Persistence state is explicit; numeric id sentinels are decoded once.

pub mod entity;
pub mod pagination;
pub mod query;
