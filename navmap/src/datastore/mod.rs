//! Datastore collaborator interface.
//!
//! The query layer talks to the navigation database exclusively through the
//! [`Datastore`] trait: statements are prepared once, identified by an opaque
//! [`StatementId`], and executed with named parameters. Rows come back as
//! [`Row`] values exposing named, typed column accessors.
//!
//! Statement ids carry the connection generation they were prepared on, so a
//! handle kept across a connection swap is rejected instead of running
//! against the wrong database.

mod sqlite;

pub use sqlite::SqliteDatastore;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A dynamically typed column or parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A named statement parameter, e.g. `(":ident", "EDDF".into())`.
pub type Param<'a> = (&'a str, Value);

/// Errors raised when reading a column from a [`Row`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RowError {
    /// The row has no column with this name.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// The column holds a value of a different type.
    #[error("column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// One result row with named column access.
///
/// Column names are shared between all rows of one result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from shared column names and values in column order.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) =
            pairs.into_iter().map(|(c, v)| (c.into(), v)).unzip();
        Self {
            columns: columns.into(),
            values,
        }
    }

    /// Column names in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns true if the row has a column with this name.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Raw value of a column.
    pub fn get(&self, column: &str) -> Result<&Value, RowError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .ok_or_else(|| RowError::MissingColumn(column.to_string()))
    }

    /// Integer column.
    pub fn int(&self, column: &str) -> Result<i64, RowError> {
        match self.get(column)? {
            Value::Integer(v) => Ok(*v),
            other => Err(mismatch(column, "integer", other)),
        }
    }

    /// Integer column narrowed to `i32`, saturating on overflow.
    pub fn int32(&self, column: &str) -> Result<i32, RowError> {
        self.int(column)
            .map(|v| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }

    /// Integer column interpreted as a flag (non-zero is true, null is false).
    pub fn flag(&self, column: &str) -> Result<bool, RowError> {
        Ok(self.opt_int(column)?.unwrap_or(0) != 0)
    }

    /// Floating point column; integers are widened.
    pub fn float(&self, column: &str) -> Result<f64, RowError> {
        match self.get(column)? {
            Value::Real(v) => Ok(*v),
            Value::Integer(v) => Ok(*v as f64),
            other => Err(mismatch(column, "real", other)),
        }
    }

    /// Text column; null reads as an empty string.
    pub fn text(&self, column: &str) -> Result<&str, RowError> {
        match self.get(column)? {
            Value::Text(v) => Ok(v),
            Value::Null => Ok(""),
            other => Err(mismatch(column, "text", other)),
        }
    }

    /// Blob column; null reads as an empty slice.
    pub fn blob(&self, column: &str) -> Result<&[u8], RowError> {
        match self.get(column)? {
            Value::Blob(v) => Ok(v),
            Value::Null => Ok(&[]),
            other => Err(mismatch(column, "blob", other)),
        }
    }

    /// Nullable integer column.
    pub fn opt_int(&self, column: &str) -> Result<Option<i64>, RowError> {
        match self.get(column)? {
            Value::Null => Ok(None),
            _ => self.int(column).map(Some),
        }
    }

    /// Nullable floating point column.
    pub fn opt_float(&self, column: &str) -> Result<Option<f64>, RowError> {
        match self.get(column)? {
            Value::Null => Ok(None),
            _ => self.float(column).map(Some),
        }
    }
}

fn mismatch(column: &str, expected: &'static str, found: &Value) -> RowError {
    RowError::TypeMismatch {
        column: column.to_string(),
        expected,
        found: match found {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        },
    }
}

/// Handle of a prepared statement.
///
/// Only valid on the connection generation it was prepared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementId {
    generation: u64,
    index: usize,
}

impl StatementId {
    /// Create a statement handle.
    pub const fn new(generation: u64, index: usize) -> Self {
        Self { generation, index }
    }

    /// Connection generation this statement was prepared on.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Position of the statement within its generation.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Errors raised by a [`Datastore`].
#[derive(Debug, Error)]
pub enum DatastoreError {
    /// The database could not be opened.
    #[error("Failed to open database {path}: {message}")]
    Open { path: String, message: String },

    /// A statement failed to compile.
    #[error("Failed to prepare statement: {0}")]
    Prepare(String),

    /// A statement failed while binding or stepping.
    #[error("Failed to execute statement {statement}: {message}")]
    Execute {
        statement: StatementId,
        message: String,
    },

    /// The statement was prepared on a connection that has since been replaced.
    #[error("Statement {statement} is stale (current generation {current})")]
    StaleStatement { statement: StatementId, current: u64 },

    /// No statement with this handle exists.
    #[error("Unknown statement {0}")]
    UnknownStatement(StatementId),

    /// A bound parameter name does not occur in the statement.
    #[error("Unknown parameter {name} for statement {statement}")]
    UnknownParameter {
        statement: StatementId,
        name: String,
    },
}

/// The relational datastore the query layer reads from.
///
/// Implementations are single-client: prepared statements are not reentrant
/// and every method takes `&mut self`.
pub trait Datastore {
    /// Compile a statement and return its handle.
    fn prepare(&mut self, sql: &str) -> Result<StatementId, DatastoreError>;

    /// Execute a prepared statement with named parameters.
    fn execute(
        &mut self,
        statement: StatementId,
        params: &[Param<'_>],
    ) -> Result<Vec<Row>, DatastoreError>;

    /// Drop every prepared statement of the current generation.
    fn finalize_all(&mut self);

    /// Generation of the current connection; bumped whenever it is replaced.
    fn generation(&self) -> u64;
}
