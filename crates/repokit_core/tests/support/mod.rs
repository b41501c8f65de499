//! Shared SQLite fixture: a `test_entities` table seeded with named rows.

#![allow(dead_code)]

use repokit_core::db::{open_db_in_memory, Migration};
use repokit_core::{
    EntityId, PersistenceEntity, PersistenceState, Repository, SqlEntity, SqliteRepository,
    SqliteRepositoryConfig,
};
use rusqlite::types::Value;
use rusqlite::{Connection, Row};

pub const ENTITIES_TOTAL: usize = 30;

pub const MIGRATIONS: &[Migration] = &[Migration::new(
    1,
    "CREATE TABLE test_entities (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL DEFAULT ''
    );",
)];

pub const SELECT_BY_ID: &str = "SELECT * FROM test_entities WHERE id = :id";
pub const SELECT_SECOND_FIVE: &str =
    "SELECT * FROM test_entities WHERE id > 5 AND id <= 10 ORDER BY id ASC";
pub const SELECT_BY_MISSING_NAME: &str =
    "SELECT * FROM test_entities WHERE name = 'no such entity'";

/// Entity equal by identity only, like a typical mapped row.
#[derive(Debug, Clone)]
pub struct TestEntity {
    pub state: PersistenceState,
    pub name: String,
}

impl TestEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: PersistenceState::Unpersisted,
            name: name.into(),
        }
    }
}

impl PartialEq for TestEntity {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl PersistenceEntity for TestEntity {
    fn persistence_state(&self) -> PersistenceState {
        self.state
    }

    fn mark_persisted(&mut self, id: EntityId) {
        self.state = PersistenceState::Persisted(id);
    }
}

impl SqlEntity for TestEntity {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            state: PersistenceState::from_raw_id(row.get("id")?),
            name: row.get("name")?,
        })
    }

    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![("name", Value::Text(self.name.clone()))]
    }
}

pub fn test_config() -> SqliteRepositoryConfig {
    SqliteRepositoryConfig::new(
        "test_entities",
        "UPDATE test_entities SET name = :name WHERE id = :id",
        "DELETE FROM test_entities WHERE id = :id",
    )
}

/// Opens an in-memory database holding `ENTITIES_TOTAL` rows with ids 1..=30.
pub fn seeded_connection() -> Connection {
    let conn = open_db_in_memory(MIGRATIONS).unwrap();
    {
        let mut repo = SqliteRepository::<TestEntity>::try_new(&conn, test_config()).unwrap();
        for index in 1..=ENTITIES_TOTAL {
            repo.add(&mut TestEntity::new(format!("entity_{index}")))
                .unwrap();
        }
    }
    conn
}

pub fn repository(conn: &Connection) -> SqliteRepository<'_, TestEntity> {
    SqliteRepository::try_new(conn, test_config()).unwrap()
}
