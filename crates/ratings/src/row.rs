//! Column-named result rows.

use common::{UserId, VideoId};
use uuid::Uuid;

use crate::{RatingsError, Result};

/// A single CQL cell value.
///
/// Only the types the ratings tables use are modeled; anything else a
/// backend returns is carried as [`Value::Unsupported`] in its debug form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Uuid(Uuid),
    Int(i32),
    BigInt(i64),
    Counter(i64),
    Text(String),
    Unsupported(String),
    Null,
}

impl Value {
    /// Returns the CQL type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Uuid(_) => "uuid",
            Value::Int(_) => "int",
            Value::BigInt(_) => "bigint",
            Value::Counter(_) => "counter",
            Value::Text(_) => "text",
            Value::Unsupported(_) => "unsupported",
            Value::Null => "null",
        }
    }
}

impl From<Uuid> for Value {
    fn from(uuid: Uuid) -> Self {
        Value::Uuid(uuid)
    }
}

impl From<VideoId> for Value {
    fn from(id: VideoId) -> Self {
        Value::Uuid(id.as_uuid())
    }
}

impl From<UserId> for Value {
    fn from(id: UserId) -> Self {
        Value::Uuid(id.as_uuid())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

/// A result row whose cells are addressed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, replacing an existing one with the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a column, replacing an existing one with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((name, value)),
        }
    }

    /// Returns the value of a column, if present.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates columns in result order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Reads a 64-bit integer column (`bigint` or `counter`). Null reads as `None`.
    pub fn get_i64(&self, name: &str) -> Result<Option<i64>> {
        match self.require(name)? {
            Value::BigInt(v) | Value::Counter(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            other => Err(type_error(name, "bigint", other)),
        }
    }

    /// Reads a 32-bit `int` column. Null reads as `None`.
    pub fn get_i32(&self, name: &str) -> Result<Option<i32>> {
        match self.require(name)? {
            Value::Int(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            other => Err(type_error(name, "int", other)),
        }
    }

    /// Reads a `uuid` column. Null reads as `None`.
    pub fn get_uuid(&self, name: &str) -> Result<Option<Uuid>> {
        match self.require(name)? {
            Value::Uuid(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            other => Err(type_error(name, "uuid", other)),
        }
    }

    fn require(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| RatingsError::MissingColumn(name.to_string()))
    }
}

impl<N: Into<String>> FromIterator<(N, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (N, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.set(name, value);
        }
        row
    }
}

fn type_error(column: &str, expected: &'static str, found: &Value) -> RatingsError {
    RatingsError::ColumnType {
        column: column.to_string(),
        expected,
        found: found.type_name(),
    }
}

/// The ordered rows returned by one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the only row, `None` for an empty set.
    ///
    /// Fails with [`RatingsError::UnexpectedRowCount`] when there is more than one row.
    pub fn single_or_none(mut self) -> Result<Option<Row>> {
        match self.rows.len() {
            0 => Ok(None),
            1 => Ok(self.rows.pop()),
            n => Err(RatingsError::UnexpectedRowCount(n)),
        }
    }
}

impl IntoIterator for RowSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
