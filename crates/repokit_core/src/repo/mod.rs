//! Repository contracts and their implementations.
//!
//! # Responsibility
//! - Define the CRUD, filtered-read and paginated-read contracts callers
//!   program against.
//! - Keep store details (SQL, containers) behind those contracts.
//!
//! # Invariants
//! - Read operations return owned snapshots; mutating a returned `Vec` never
//!   changes the repository.
//! - "Nothing matched" is data (`Ok(None)` / empty `Vec`), never an error.
//! - `remove` is idempotent: removing an absent entity is a silent no-op.
//! - `update` never inserts; `upsert` is the insert-or-update operation.

use crate::db::DbError;
use crate::model::pagination::PaginationData;
use crate::model::query::QueryData;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub mod collection_repo;
pub mod sqlite_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy shared by every repository implementation.
#[derive(Debug)]
pub enum RepoError {
    /// A required input was missing or out of range.
    InvalidArgument(String),
    /// The repository cannot evaluate this kind of filter.
    UnsupportedFilter {
        repository: &'static str,
        filter: &'static str,
    },
    Db(DbError),
    /// A stored row could not be decoded into an entity.
    InvalidData(String),
    MissingRequiredTable(String),
    MissingRequiredColumn {
        table: String,
        column: String,
    },
    InvalidConfig(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::UnsupportedFilter { repository, filter } => {
                write!(f, "{repository} repository does not support {filter} filters")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::InvalidConfig(message) => write!(f, "invalid repository config: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Selection criteria for filtered reads.
///
/// In-process containers evaluate predicates; store adapters execute
/// structured queries. A repository handed the other variant fails with
/// [`RepoError::UnsupportedFilter`].
pub enum Filter<'f, V> {
    Predicate(Box<dyn Fn(&V) -> bool + 'f>),
    Query(QueryData),
}

impl<'f, V> Filter<'f, V> {
    pub fn predicate(predicate: impl Fn(&V) -> bool + 'f) -> Self {
        Self::Predicate(Box::new(predicate))
    }

    pub fn query(query: QueryData) -> Self {
        Self::Query(query)
    }

    /// Filter accepting every entity.
    pub fn all() -> Self {
        Self::predicate(|_| true)
    }

    /// Short variant name used in errors and log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Predicate(_) => "predicate",
            Self::Query(_) => "query",
        }
    }
}

impl<V> From<QueryData> for Filter<'_, V> {
    fn from(value: QueryData) -> Self {
        Self::Query(value)
    }
}

impl<V> Debug for Filter<'_, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("Filter::Predicate(..)"),
            Self::Query(query) => f.debug_tuple("Filter::Query").field(query).finish(),
        }
    }
}

/// CRUD access to a set of entities.
pub trait Repository<V> {
    /// Inserts an entity. Store adapters write the generated id back into it.
    fn add(&mut self, entity: &mut V) -> RepoResult<()>;
    /// Deletes an entity if present; no-op otherwise.
    fn remove(&mut self, entity: &V) -> RepoResult<()>;
    /// Replaces the stored counterpart of `entity`; no-op if there is none.
    fn update(&mut self, entity: &mut V) -> RepoResult<()>;
    /// Updates when the entity is already stored, inserts otherwise.
    fn upsert(&mut self, entity: &mut V) -> RepoResult<()>;
    fn get_all(&self) -> RepoResult<Vec<V>>;
}

/// Repository queryable by a [`Filter`].
pub trait FilteredRepository<V>: Repository<V> {
    /// All entities matching `filter`, in retrieval order.
    fn get_collection(&self, filter: &Filter<'_, V>) -> RepoResult<Vec<V>>;
    /// First entity matching `filter`, or `None`.
    fn get_entity(&self, filter: &Filter<'_, V>) -> RepoResult<Option<V>>;
}

/// Filtered repository with offset/limit windows over its reads.
pub trait PaginatedRepository<V>: FilteredRepository<V> {
    fn get_all_paged(&self, pagination: &PaginationData) -> RepoResult<Vec<V>>;
    fn get_collection_paged(
        &self,
        filter: &Filter<'_, V>,
        pagination: &PaginationData,
    ) -> RepoResult<Vec<V>>;
}
