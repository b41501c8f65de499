//! Store-agnostic repository contracts with in-memory and SQLite implementations.
//! Callers program against the traits in [`repo`]; the concrete store stays
//! behind them.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{LoggingConfig, SqliteRepositoryConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{EntityId, PersistenceEntity, PersistenceState};
pub use model::pagination::PaginationData;
pub use model::query::{QueryData, QueryValue};
pub use repo::collection_repo::{CollectionRepository, EntityStore};
pub use repo::sqlite_repo::{SqlEntity, SqliteRepository};
pub use repo::{
    Filter, FilteredRepository, PaginatedRepository, RepoError, RepoResult, Repository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
