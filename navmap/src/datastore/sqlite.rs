//! SQLite implementation of the datastore collaborator.

use std::path::Path;
use std::sync::Arc;

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OpenFlags};

use super::{Datastore, DatastoreError, Param, Row, StatementId, Value};

/// Enough room for every statement the query layer prepares.
const STATEMENT_CACHE_CAPACITY: usize = 128;

/// A navigation database backed by a single SQLite connection.
///
/// Statements are compiled through rusqlite's statement cache; a
/// [`StatementId`] indexes the SQL text registered by [`Datastore::prepare`].
pub struct SqliteDatastore {
    conn: Connection,
    statements: Vec<String>,
    generation: u64,
}

impl SqliteDatastore {
    /// Open a database file read-only.
    pub fn open(path: &Path) -> Result<Self, DatastoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| DatastoreError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_connection(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, DatastoreError> {
        let conn = Connection::open_in_memory().map_err(|e| DatastoreError::Open {
            path: ":memory:".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
        Self {
            conn,
            statements: Vec::new(),
            generation: 0,
        }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Swap in a new connection.
    ///
    /// All statements prepared so far become stale.
    pub fn replace_connection(&mut self, conn: Connection) {
        self.finalize_all();
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
        self.conn = conn;
        self.generation += 1;
        tracing::info!(generation = self.generation, "Datastore connection replaced");
    }

    fn sql_for(&self, statement: StatementId) -> Result<&str, DatastoreError> {
        if statement.generation() != self.generation {
            return Err(DatastoreError::StaleStatement {
                statement,
                current: self.generation,
            });
        }
        self.statements
            .get(statement.index())
            .map(String::as_str)
            .ok_or(DatastoreError::UnknownStatement(statement))
    }
}

impl Datastore for SqliteDatastore {
    fn prepare(&mut self, sql: &str) -> Result<StatementId, DatastoreError> {
        self.conn
            .prepare_cached(sql)
            .map_err(|e| DatastoreError::Prepare(e.to_string()))?;
        self.statements.push(sql.to_string());
        Ok(StatementId::new(self.generation, self.statements.len() - 1))
    }

    fn execute(
        &mut self,
        statement: StatementId,
        params: &[Param<'_>],
    ) -> Result<Vec<Row>, DatastoreError> {
        let execute_error = |e: rusqlite::Error| DatastoreError::Execute {
            statement,
            message: e.to_string(),
        };

        let sql = self.sql_for(statement)?;
        let mut stmt = self.conn.prepare_cached(sql).map_err(execute_error)?;

        for (name, value) in params {
            let index = stmt
                .parameter_index(name)
                .map_err(execute_error)?
                .ok_or_else(|| DatastoreError::UnknownParameter {
                    statement,
                    name: (*name).to_string(),
                })?;
            stmt.raw_bind_parameter(index, value)
                .map_err(execute_error)?;
        }

        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let column_count = columns.len();

        let mut result = Vec::new();
        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next().map_err(execute_error)? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(Value::from(row.get_ref(i).map_err(execute_error)?));
            }
            result.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(result)
    }

    fn finalize_all(&mut self) {
        self.statements.clear();
        self.conn.flush_prepared_statement_cache();
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Real(v),
            ValueRef::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => Value::Blob(v.to_vec()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            Value::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            Value::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Value::Blob(v) => ToSqlOutput::Borrowed(ValueRef::Blob(v)),
        })
    }
}
