//! The SQLite [`ContactStore`].
//!
//! Every table of [`rolodex_query::schema`] maps to one SQL table. The
//! connection sits behind a mutex; each trait call holds it for the whole
//! statement, and [`ContactStore::apply`] runs its batch in one transaction.

use std::fmt::Write as _;

use parking_lot::Mutex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, OptionalExtension, params_from_iter};
use tracing::{debug, info};

use rolodex_query::error::{QueryError, QueryResult};
use rolodex_query::schema::{ColumnType, Table};
use rolodex_query::store::{Comparison, Condition, ContactStore, Mutation, SortKey, TableQuery};
use rolodex_query::types::{IdSet, RecordId, Row, Value};

use crate::config::{DatabasePath, SqliteConfig};
use crate::error::{SqliteError, SqliteResult};

const SEQUENCES: &str = "rolodex_sequences";

/// A [`ContactStore`] backed by one SQLite connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    config: SqliteConfig,
}

impl SqliteStore {
    /// Open (and create when needed) the database described by `config`.
    pub fn open(config: SqliteConfig) -> SqliteResult<Self> {
        let conn = match config.path {
            DatabasePath::Memory => Connection::open_in_memory()?,
            DatabasePath::File(ref path) => Connection::open(path)?,
        };

        if let Some(timeout) = config.busy_timeout_duration() {
            conn.busy_timeout(timeout)?;
        }
        for (pragma, value) in config.pragmas() {
            conn.pragma_update(None, pragma, value)?;
        }
        let journal: String = conn.pragma_update_and_check(
            None,
            "journal_mode",
            config.journal_mode.as_pragma(),
            |row| row.get(0),
        )?;

        conn.execute_batch(&schema_sql())?;
        info!(path = %config.path, journal = %journal, "SqliteStore opened");

        Ok(Self {
            conn: Mutex::new(conn),
            config,
        })
    }

    /// Open a fresh in-memory database.
    pub fn memory() -> SqliteResult<Self> {
        Self::open(SqliteConfig::memory())
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    fn query_keys(&self, query: &TableQuery) -> SqliteResult<IdSet> {
        let mut params = Vec::new();
        let sql = format!(
            "SELECT DISTINCT {key} FROM {table} WHERE {filter}",
            key = query.key,
            table = query.table,
            filter = where_clause(query, &mut params)?,
        );
        debug!(sql = %sql, params = params.len(), "SqliteStore::select_keys()");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let keys = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get::<_, i64>(0))?
            .collect::<Result<IdSet, _>>()?;
        Ok(keys)
    }

    fn query_sorted(&self, query: &TableQuery, sort: SortKey) -> SqliteResult<Vec<RecordId>> {
        check_column(query.table, sort.column)?;
        let mut params = Vec::new();
        let sql = format!(
            "SELECT {key} FROM {table} WHERE {filter} \
             ORDER BY {column} IS NULL, {column} {order}, {key} ASC",
            key = query.key,
            table = query.table,
            filter = where_clause(query, &mut params)?,
            column = sort.column,
            order = sort.order.as_sql(),
        );
        debug!(sql = %sql, params = params.len(), "SqliteStore::select_sorted()");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let keys = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn query_rows(&self, table: Table, column: &str, key: RecordId) -> SqliteResult<Vec<Row>> {
        check_column(table, column)?;
        let columns = table.columns();
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY rowid",
            columns.iter().map(|c| c.name).collect::<Vec<_>>().join(", "),
            table,
            column
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map([key], |sql_row| {
                let mut row = Row::with_capacity(columns.len());
                for (i, col) in columns.iter().enumerate() {
                    row.insert(col.name, from_sql(sql_row.get_ref(i)?, col.ty));
                }
                Ok(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn write(&self, mutations: Vec<Mutation>) -> SqliteResult<()> {
        let count = mutations.len();
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        for mutation in mutations {
            match mutation {
                Mutation::Insert { table, row } => {
                    let mut names = Vec::with_capacity(row.len());
                    let mut values = Vec::with_capacity(row.len());
                    for (column, value) in &row {
                        check_column(table, column)?;
                        names.push(*column);
                        values.push(to_sql(value));
                    }
                    let placeholders: Vec<String> =
                        (1..=values.len()).map(|i| format!("?{}", i)).collect();
                    let sql = format!(
                        "INSERT INTO {} ({}) VALUES ({})",
                        table,
                        names.join(", "),
                        placeholders.join(", ")
                    );
                    tx.prepare_cached(&sql)?
                        .execute(params_from_iter(values.iter()))?;
                }
                Mutation::Delete { table, column, key } => {
                    check_column(table, column)?;
                    let sql = format!("DELETE FROM {} WHERE {} = ?1", table, column);
                    tx.prepare_cached(&sql)?.execute([key])?;
                }
            }
        }
        // Dropping an uncommitted transaction rolls it back.
        tx.commit()?;
        debug!(mutations = count, "SqliteStore::apply()");
        Ok(())
    }

    fn allocate(&self, table: Table) -> SqliteResult<RecordId> {
        if !table.has_primary_key() {
            return Err(SqliteError::schema(format!("Table {} has no id column", table)));
        }
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let last: Option<i64> = tx
            .query_row(
                &format!("SELECT value FROM {} WHERE name = ?1", SEQUENCES),
                [table.name()],
                |row| row.get(0),
            )
            .optional()?;
        let max: i64 = tx.query_row(
            &format!("SELECT COALESCE(MAX(id), 0) FROM {}", table),
            [],
            |row| row.get(0),
        )?;

        let next = last.unwrap_or(0).max(max) + 1;
        tx.execute(
            &format!(
                "INSERT INTO {} (name, value) VALUES (?1, ?2) \
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value",
                SEQUENCES
            ),
            rusqlite::params![table.name(), next],
        )?;
        tx.commit()?;
        Ok(next)
    }
}

impl ContactStore for SqliteStore {
    fn select_keys(&self, query: &TableQuery) -> QueryResult<IdSet> {
        self.query_keys(query)
            .map_err(|e| QueryError::from(e).with_context("select_keys"))
    }

    fn select_sorted(&self, query: &TableQuery, sort: SortKey) -> QueryResult<Vec<RecordId>> {
        self.query_sorted(query, sort)
            .map_err(|e| QueryError::from(e).with_context("select_sorted"))
    }

    fn fetch(&self, table: Table, column: &'static str, key: RecordId) -> QueryResult<Vec<Row>> {
        self.query_rows(table, column, key)
            .map_err(|e| QueryError::from(e).with_context("fetch"))
    }

    fn apply(&self, mutations: Vec<Mutation>) -> QueryResult<()> {
        self.write(mutations)
            .map_err(|e| QueryError::from(e).with_context("apply"))
    }

    fn next_id(&self, table: Table) -> QueryResult<RecordId> {
        self.allocate(table)
            .map_err(|e| QueryError::from(e).with_context("next_id"))
    }
}

/// Version of the linked SQLite library.
pub fn sqlite_version() -> &'static str {
    rusqlite::version()
}

/// `CREATE TABLE` and `CREATE INDEX` statements for every table.
pub fn schema_sql() -> String {
    let mut sql = String::new();
    for table in Table::ALL {
        let columns: Vec<String> = table
            .columns()
            .iter()
            .map(|c| {
                if c.name == "id" && table.has_primary_key() {
                    "id INTEGER PRIMARY KEY".to_string()
                } else {
                    format!("{} {}", c.name, c.ty.as_sql())
                }
            })
            .collect();
        let _ = writeln!(
            sql,
            "CREATE TABLE IF NOT EXISTS {} ({});",
            table,
            columns.join(", ")
        );
        if !table.has_primary_key() {
            let _ = writeln!(
                sql,
                "CREATE INDEX IF NOT EXISTS idx_{0}_contact_id ON {0} (contact_id);",
                table
            );
        }
    }
    let _ = writeln!(
        sql,
        "CREATE INDEX IF NOT EXISTS idx_contacts_person_id ON contacts (person_id);\n\
         CREATE INDEX IF NOT EXISTS idx_contacts_address_book_id ON contacts (address_book_id);\n\
         CREATE TABLE IF NOT EXISTS {} (name TEXT PRIMARY KEY, value INTEGER NOT NULL);",
        SEQUENCES
    );
    sql
}

fn check_column(table: Table, column: &str) -> SqliteResult<()> {
    match table.column(column) {
        Some(_) => Ok(()),
        None => Err(SqliteError::schema(format!(
            "Table {} has no column {}",
            table, column
        ))),
    }
}

/// Build the WHERE clause of a keyed query, pushing its parameters.
fn where_clause(query: &TableQuery, params: &mut Vec<SqlValue>) -> SqliteResult<String> {
    check_column(query.table, query.key)?;
    let mut parts = vec![format!("{} IS NOT NULL", query.key)];

    for condition in &query.conditions {
        parts.push(condition_sql(query.table, condition, params)?);
    }

    if let Some(ref keys) = query.keys {
        if keys.is_empty() {
            parts.push("0".to_string());
        } else {
            // Ids are integers, so they are inlined rather than bound.
            let list: Vec<String> = keys.iter().map(i64::to_string).collect();
            parts.push(format!("{} IN ({})", query.key, list.join(", ")));
        }
    }

    Ok(parts.join(" AND "))
}

fn condition_sql(
    table: Table,
    condition: &Condition,
    params: &mut Vec<SqlValue>,
) -> SqliteResult<String> {
    check_column(table, condition.column)?;
    let column = condition.column;
    let bind = |params: &mut Vec<SqlValue>| {
        params.push(to_sql(&condition.value));
        params.len()
    };

    Ok(match condition.op {
        Comparison::Exists => format!("{} IS NOT NULL", column),
        Comparison::Equals => format!("{} = ?{}", column, bind(params)),
        Comparison::Gte => format!("{} >= ?{}", column, bind(params)),
        Comparison::Lte => format!("{} <= ?{}", column, bind(params)),
        Comparison::EqualsIgnoreCase => format!("lower({}) = lower(?{})", column, bind(params)),
        Comparison::Contains => format!("instr(lower({}), lower(?{})) > 0", column, bind(params)),
        Comparison::StartsWith => format!("instr(lower({}), lower(?{})) = 1", column, bind(params)),
        Comparison::EndsWith => format!(
            "({c} IS NOT NULL AND (length(?{p}) = 0 OR substr(lower({c}), -length(?{p})) = lower(?{p})))",
            c = column,
            p = bind(params)
        ),
    })
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Int(i) => SqlValue::Integer(*i),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn from_sql(value: ValueRef<'_>, ty: ColumnType) -> Value {
    match (value, ty) {
        (ValueRef::Null, _) => Value::Null,
        (ValueRef::Integer(i), ColumnType::Boolean) => Value::Bool(i != 0),
        (ValueRef::Integer(i), _) => Value::Int(i),
        (ValueRef::Real(f), _) => Value::Int(f as i64),
        (ValueRef::Text(bytes), _) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        (ValueRef::Blob(_), _) => Value::Null,
    }
}
