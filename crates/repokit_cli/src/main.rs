//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `repokit_core` linkage.
//! - Drive both repository backends through the shared traits.
//! - Keep output deterministic for quick local sanity checks.

use log::error;
use repokit_core::db::{open_db_in_memory, Migration};
use repokit_core::{
    core_version, init_logging, CollectionRepository, EntityId, Filter, FilteredRepository,
    LoggingConfig, PaginatedRepository, PaginationData, PersistenceEntity, PersistenceState,
    QueryData, RepoError, Repository, SqlEntity, SqliteRepository, SqliteRepositoryConfig,
};
use rusqlite::types::Value;
use rusqlite::Row;
use std::process::ExitCode;

const PROBE_MIGRATIONS: &[Migration] = &[Migration::new(
    1,
    "CREATE TABLE probe_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        label TEXT NOT NULL
    );",
)];

#[derive(Debug, Clone)]
struct ProbeItem {
    state: PersistenceState,
    label: String,
}

impl PersistenceEntity for ProbeItem {
    fn persistence_state(&self) -> PersistenceState {
        self.state
    }

    fn mark_persisted(&mut self, id: EntityId) {
        self.state = PersistenceState::Persisted(id);
    }
}

impl SqlEntity for ProbeItem {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            state: PersistenceState::from_raw_id(row.get("id")?),
            label: row.get("label")?,
        })
    }

    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![("label", Value::Text(self.label.clone()))]
    }
}

fn main() -> ExitCode {
    // Logging is optional for the probe: REPOKIT_LOG_DIR enables file logs.
    if let Some(log_dir) = std::env::var_os("REPOKIT_LOG_DIR") {
        if let Err(message) = init_logging(&LoggingConfig::new("debug", log_dir)) {
            eprintln!("repokit logging disabled: {message}");
        }
    }

    println!("repokit_core version={}", core_version());
    match run_probe() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_probe module=cli status=error error={err}");
            eprintln!("repokit probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_probe() -> Result<(), RepoError> {
    let mut memory = CollectionRepository::new();
    for label in ["alpha", "beta", "gamma", "delta"] {
        memory.add(&mut label.to_string())?;
    }
    let short = Filter::predicate(|label: &String| label.len() <= 4);
    println!("collection short={:?}", memory.get_collection(&short)?);
    println!(
        "collection page2={:?}",
        memory.get_all_paged(&PaginationData::new(2, 3)?)?
    );

    let conn = open_db_in_memory(PROBE_MIGRATIONS)?;
    let config = SqliteRepositoryConfig::new(
        "probe_items",
        "UPDATE probe_items SET label = :label WHERE id = :id",
        "DELETE FROM probe_items WHERE id = :id",
    );
    let mut sqlite = SqliteRepository::<ProbeItem>::try_new(&conn, config)?;
    for index in 1..=5 {
        sqlite.add(&mut ProbeItem {
            state: PersistenceState::Unpersisted,
            label: format!("item_{index}"),
        })?;
    }

    let query = QueryData::with_parameters(
        "SELECT * FROM probe_items WHERE id >= :min_id ORDER BY id ASC",
        [("min_id", 2_i64)],
    )?;
    let page = sqlite.get_collection_paged(&Filter::query(query), &PaginationData::new(1, 2)?)?;
    let labels: Vec<_> = page.iter().map(|item| item.label.as_str()).collect();
    println!("sqlite page1={labels:?}");
    Ok(())
}
