//! Injected configuration structs for the composition root.
//!
//! # Responsibility
//! - Describe how a store-backed repository maps onto its table.
//! - Describe where and how verbosely the core logs.
//!
//! # Invariants
//! - Identifiers interpolated into SQL must pass `validate()` first.
//! - Structs deserialize from any serde format; loading them is the caller's job.

use crate::repo::{RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

static SQL_IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

const DEFAULT_ID_COLUMN: &str = "id";

pub(crate) fn is_sql_identifier(value: &str) -> bool {
    SQL_IDENTIFIER_RE.is_match(value)
}

fn default_id_column() -> String {
    DEFAULT_ID_COLUMN.to_string()
}

/// Table mapping for [`crate::repo::sqlite_repo::SqliteRepository`].
///
/// `update_sql` and `delete_sql` are named-parameter templates; they are
/// bound with the entity's column values plus `:<id_column>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteRepositoryConfig {
    pub table: String,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    pub update_sql: String,
    pub delete_sql: String,
    /// Replaces the default `SELECT * FROM <table> ORDER BY <id_column> ASC`.
    #[serde(default)]
    pub select_all_sql: Option<String>,
}

impl SqliteRepositoryConfig {
    /// Creates a config with the default `id` column and select-all query.
    pub fn new(
        table: impl Into<String>,
        update_sql: impl Into<String>,
        delete_sql: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            id_column: default_id_column(),
            update_sql: update_sql.into(),
            delete_sql: delete_sql.into(),
            select_all_sql: None,
        }
    }

    pub fn with_id_column(mut self, id_column: impl Into<String>) -> Self {
        self.id_column = id_column.into();
        self
    }

    pub fn with_select_all_sql(mut self, sql: impl Into<String>) -> Self {
        self.select_all_sql = Some(sql.into());
        self
    }

    /// # Errors
    /// - `InvalidConfig` when the table or id column is not a plain SQL
    ///   identifier, or when a template is blank.
    pub fn validate(&self) -> RepoResult<()> {
        for (field, value) in [("table", &self.table), ("id_column", &self.id_column)] {
            if !is_sql_identifier(value) {
                return Err(RepoError::InvalidConfig(format!(
                    "{field} `{value}` is not a valid SQL identifier"
                )));
            }
        }

        let mut templates = vec![
            ("update_sql", self.update_sql.as_str()),
            ("delete_sql", self.delete_sql.as_str()),
        ];
        if let Some(select_all) = self.select_all_sql.as_deref() {
            templates.push(("select_all_sql", select_all));
        }
        for (field, value) in templates {
            if value.trim().is_empty() {
                return Err(RepoError::InvalidConfig(format!("{field} cannot be blank")));
            }
        }

        Ok(())
    }

    /// The query used by `get_all` and its paginated variant.
    pub fn select_all_query(&self) -> String {
        match self.select_all_sql.as_deref() {
            Some(sql) => sql.to_string(),
            None => format!(
                "SELECT * FROM {} ORDER BY {} ASC",
                self.table, self.id_column
            ),
        }
    }
}

/// Logging bootstrap settings consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Absolute directory receiving rotated log files.
    pub log_dir: PathBuf,
}

fn default_level() -> String {
    crate::logging::default_log_level().to_string()
}

impl LoggingConfig {
    pub fn new(level: impl Into<String>, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: level.into(),
            log_dir: log_dir.into(),
        }
    }
}
