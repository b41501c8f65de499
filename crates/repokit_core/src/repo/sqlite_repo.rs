//! SQLite-backed repository over one mapped table.
//!
//! # Responsibility
//! - Execute named-parameter queries described by `QueryData`.
//! - Insert new entities and hand the generated key back to the caller.
//! - Run caller-configured update/delete templates for stored entities.
//!
//! # Invariants
//! - Every `:name` placeholder in an executed statement must have a value;
//!   parameters the statement does not reference are ignored.
//! - Unpersisted entities are never updated or deleted.
//! - Rows that cannot be decoded surface as `InvalidData`, not as a silent skip.
//! - Transactions belong to the caller; pass a `Transaction` (it derefs to
//!   `Connection`) to group calls.

use crate::config::{is_sql_identifier, SqliteRepositoryConfig};
use crate::model::entity::{EntityId, PersistenceEntity, PersistenceState};
use crate::model::pagination::PaginationData;
use crate::model::query::{QueryData, QueryValue};
use crate::repo::{
    Filter, FilteredRepository, PaginatedRepository, RepoError, RepoResult, Repository,
};
use indexmap::IndexMap;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, Statement};
use std::marker::PhantomData;

const PAGE_LIMIT_PARAM: &str = "repokit_page_limit";
const PAGE_OFFSET_PARAM: &str = "repokit_page_offset";

type BindValues = IndexMap<String, Value>;

/// Entity that can be written to and read from a SQLite row.
pub trait SqlEntity: PersistenceEntity + Sized {
    /// Builds an entity from a result row.
    ///
    /// Implementations should decode the id column through
    /// [`PersistenceState::from_raw_id`].
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Column values keyed by column name, without the id column.
    fn column_values(&self) -> Vec<(&'static str, Value)>;
}

/// Repository mapping `V` onto the table named in its config.
pub struct SqliteRepository<'conn, V> {
    conn: &'conn Connection,
    config: SqliteRepositoryConfig,
    _entity: PhantomData<fn() -> V>,
}

impl<'conn, V: SqlEntity> SqliteRepository<'conn, V> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `InvalidConfig` when the config does not validate.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the mapped
    ///   table or its id column does not exist.
    pub fn try_new(conn: &'conn Connection, config: SqliteRepositoryConfig) -> RepoResult<Self> {
        config.validate()?;
        ensure_table_ready(conn, &config)?;
        Ok(Self {
            conn,
            config,
            _entity: PhantomData,
        })
    }

    pub fn config(&self) -> &SqliteRepositoryConfig {
        &self.config
    }

    fn fetch(&self, sql: &str, values: &BindValues, first_only: bool) -> RepoResult<Vec<V>> {
        let mut stmt = self.conn.prepare(sql)?;
        bind_named(&mut stmt, values)?;

        let mut rows = stmt.raw_query();
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(decode_row(row)?);
            if first_only {
                break;
            }
        }

        Ok(entities)
    }

    fn execute(&self, sql: &str, values: &BindValues) -> RepoResult<usize> {
        let mut stmt = self.conn.prepare(sql)?;
        bind_named(&mut stmt, values)?;
        Ok(stmt.raw_execute()?)
    }

    fn query_of<'f>(&self, filter: &'f Filter<'_, V>) -> RepoResult<&'f QueryData> {
        match filter {
            Filter::Query(query) => Ok(query),
            Filter::Predicate(_) => Err(RepoError::UnsupportedFilter {
                repository: "sqlite",
                filter: filter.kind(),
            }),
        }
    }

    fn entity_values(&self, entity: &V, id: EntityId) -> BindValues {
        let mut values: BindValues = entity
            .column_values()
            .into_iter()
            .map(|(column, value)| (column.to_string(), value))
            .collect();
        values.insert(self.config.id_column.clone(), Value::Integer(id));
        values
    }

    fn insert(&self, entity: &mut V) -> RepoResult<EntityId> {
        let columns: Vec<(&'static str, Value)> = entity
            .column_values()
            .into_iter()
            .filter(|(column, _)| *column != self.config.id_column)
            .collect();

        if let Some((column, _)) = columns.iter().find(|(column, _)| !is_sql_identifier(column)) {
            return Err(RepoError::InvalidConfig(format!(
                "column `{column}` is not a valid SQL identifier"
            )));
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES;", self.config.table)
        } else {
            let names: Vec<&str> = columns.iter().map(|(column, _)| *column).collect();
            let placeholders: Vec<String> =
                names.iter().map(|column| format!(":{column}")).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({});",
                self.config.table,
                names.join(", "),
                placeholders.join(", ")
            )
        };

        let values: BindValues = columns
            .into_iter()
            .map(|(column, value)| (column.to_string(), value))
            .collect();
        self.execute(&sql, &values)?;

        let id = self.conn.last_insert_rowid();
        entity.mark_persisted(id);
        Ok(id)
    }
}

impl<V: SqlEntity> Repository<V> for SqliteRepository<'_, V> {
    fn add(&mut self, entity: &mut V) -> RepoResult<()> {
        if let Some(id) = entity.id() {
            return Err(RepoError::InvalidArgument(format!(
                "entity is already persisted with id {id}; use update or upsert"
            )));
        }

        let id = self.insert(entity)?;
        debug!(
            "event=repo_add module=repo repository=sqlite status=ok table={} id={}",
            self.config.table, id
        );
        Ok(())
    }

    fn remove(&mut self, entity: &V) -> RepoResult<()> {
        let Some(id) = entity.id() else {
            debug!(
                "event=repo_remove module=repo repository=sqlite status=skipped table={} reason=unpersisted",
                self.config.table
            );
            return Ok(());
        };

        let values = self.entity_values(entity, id);
        let changed = self.execute(&self.config.delete_sql, &values)?;
        debug!(
            "event=repo_remove module=repo repository=sqlite status=ok table={} id={} changed={}",
            self.config.table, id, changed
        );
        Ok(())
    }

    fn update(&mut self, entity: &mut V) -> RepoResult<()> {
        let Some(id) = entity.id() else {
            debug!(
                "event=repo_update module=repo repository=sqlite status=skipped table={} reason=unpersisted",
                self.config.table
            );
            return Ok(());
        };

        let values = self.entity_values(entity, id);
        let changed = self.execute(&self.config.update_sql, &values)?;
        debug!(
            "event=repo_update module=repo repository=sqlite status=ok table={} id={} changed={}",
            self.config.table, id, changed
        );
        Ok(())
    }

    fn upsert(&mut self, entity: &mut V) -> RepoResult<()> {
        match entity.persistence_state() {
            PersistenceState::Unpersisted => self.add(entity),
            PersistenceState::Persisted(_) => self.update(entity),
        }
    }

    fn get_all(&self) -> RepoResult<Vec<V>> {
        self.fetch(&self.config.select_all_query(), &BindValues::new(), false)
    }
}

impl<V: SqlEntity> FilteredRepository<V> for SqliteRepository<'_, V> {
    fn get_collection(&self, filter: &Filter<'_, V>) -> RepoResult<Vec<V>> {
        let query = self.query_of(filter)?;
        let entities = self.fetch(query.query(), &query_values(query), false)?;
        debug!(
            "event=repo_query module=repo repository=sqlite status=ok table={} rows={}",
            self.config.table,
            entities.len()
        );
        Ok(entities)
    }

    fn get_entity(&self, filter: &Filter<'_, V>) -> RepoResult<Option<V>> {
        let query = self.query_of(filter)?;
        let entity = self
            .fetch(query.query(), &query_values(query), true)?
            .into_iter()
            .next();
        Ok(entity)
    }
}

impl<V: SqlEntity> PaginatedRepository<V> for SqliteRepository<'_, V> {
    fn get_all_paged(&self, pagination: &PaginationData) -> RepoResult<Vec<V>> {
        let mut values = BindValues::new();
        push_page_values(&mut values, pagination);
        self.fetch(&paged_sql(&self.config.select_all_query()), &values, false)
    }

    fn get_collection_paged(
        &self,
        filter: &Filter<'_, V>,
        pagination: &PaginationData,
    ) -> RepoResult<Vec<V>> {
        let query = self.query_of(filter)?;
        let mut values = query_values(query);
        push_page_values(&mut values, pagination);
        self.fetch(&paged_sql(query.query()), &values, false)
    }
}

fn query_values(query: &QueryData) -> BindValues {
    query
        .parameters()
        .iter()
        .map(|(key, value)| (key.clone(), to_sql_value(value)))
        .collect()
}

fn to_sql_value(value: &QueryValue) -> Value {
    match value {
        QueryValue::Bool(value) => Value::Integer(i64::from(*value)),
        QueryValue::Integer(value) => Value::Integer(*value),
        QueryValue::Real(value) => Value::Real(*value),
        QueryValue::Text(value) => Value::Text(value.clone()),
        QueryValue::Blob(value) => Value::Blob(value.clone()),
    }
}

fn push_page_values(values: &mut BindValues, pagination: &PaginationData) {
    let limit = i64::try_from(pagination.limit()).unwrap_or(i64::MAX);
    let offset = i64::try_from(pagination.offset()).unwrap_or(i64::MAX);
    values.insert(PAGE_LIMIT_PARAM.to_string(), Value::Integer(limit));
    values.insert(PAGE_OFFSET_PARAM.to_string(), Value::Integer(offset));
}

/// Windows `sql` as a subquery so its own `LIMIT` or trailing line comment
/// cannot interfere with the page clause.
fn paged_sql(sql: &str) -> String {
    let base = sql.trim().trim_end_matches(';').trim_end();
    format!("SELECT * FROM (\n{base}\n) LIMIT :{PAGE_LIMIT_PARAM} OFFSET :{PAGE_OFFSET_PARAM}")
}

fn bind_named(stmt: &mut Statement<'_>, values: &BindValues) -> RepoResult<()> {
    for index in 1..=stmt.parameter_count() {
        let name = stmt.parameter_name(index).map(str::to_string);
        let Some(name) = name.filter(|name| !name.starts_with('?')) else {
            return Err(RepoError::InvalidArgument(format!(
                "positional parameter at index {index} is not supported; use named parameters"
            )));
        };

        let key = name.trim_start_matches([':', '@', '$']);
        let value = values.get(key).ok_or_else(|| {
            RepoError::InvalidArgument(format!("missing value for query parameter `{name}`"))
        })?;
        stmt.raw_bind_parameter(index, value)?;
    }
    Ok(())
}

fn decode_row<V: SqlEntity>(row: &Row<'_>) -> RepoResult<V> {
    V::from_row(row).map_err(|err| {
        if is_decode_error(&err) {
            RepoError::InvalidData(err.to_string())
        } else {
            RepoError::from(err)
        }
    })
}

fn is_decode_error(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
            | rusqlite::Error::InvalidColumnIndex(_)
            | rusqlite::Error::InvalidColumnName(_)
            | rusqlite::Error::InvalidColumnType(..)
    )
}

fn ensure_table_ready(conn: &Connection, config: &SqliteRepositoryConfig) -> RepoResult<()> {
    if !table_exists(conn, &config.table)? {
        return Err(RepoError::MissingRequiredTable(config.table.clone()));
    }
    if !table_has_column(conn, &config.table, &config.id_column)? {
        return Err(RepoError::MissingRequiredColumn {
            table: config.table.clone(),
            column: config.id_column.clone(),
        });
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type IN ('table', 'view') AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current.eq_ignore_ascii_case(column) {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{bind_named, paged_sql, to_sql_value, BindValues};
    use crate::model::query::QueryValue;
    use crate::repo::RepoError;
    use rusqlite::types::Value;
    use rusqlite::Connection;

    #[test]
    fn paged_sql_wraps_query_without_trailing_semicolon() {
        assert_eq!(
            paged_sql("SELECT * FROM items ORDER BY id;  "),
            "SELECT * FROM (\nSELECT * FROM items ORDER BY id\n) \
             LIMIT :repokit_page_limit OFFSET :repokit_page_offset"
        );
    }

    #[test]
    fn bool_values_bind_as_integers() {
        assert_eq!(to_sql_value(&QueryValue::Bool(true)), Value::Integer(1));
        assert_eq!(
            to_sql_value(&QueryValue::Text("x".to_string())),
            Value::Text("x".to_string())
        );
    }

    #[test]
    fn missing_named_value_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT :a + :b;").unwrap();
        let mut values = BindValues::new();
        values.insert("a".to_string(), Value::Integer(1));

        let err = bind_named(&mut stmt, &values).unwrap_err();
        assert!(matches!(err, RepoError::InvalidArgument(message) if message.contains(":b")));
    }

    #[test]
    fn positional_parameters_are_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT ?;").unwrap();
        let err = bind_named(&mut stmt, &BindValues::new()).unwrap_err();
        assert!(matches!(err, RepoError::InvalidArgument(_)));
    }

    #[test]
    fn unreferenced_values_are_ignored() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT :a;").unwrap();
        let mut values = BindValues::new();
        values.insert("a".to_string(), Value::Integer(7));
        values.insert("unused".to_string(), Value::Integer(8));

        bind_named(&mut stmt, &values).unwrap();
        let mut rows = stmt.raw_query();
        let row = rows.next().unwrap().unwrap();
        assert_eq!(row.get::<_, i64>(0).unwrap(), 7);
    }
}
