use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::{UserId, VideoId};
use tokio::sync::RwLock;

use crate::{BoundStatement, RatingsError, Result, Row, RowSet, Session, Value};

/// In-memory session for testing.
///
/// Holds the two ratings tables and understands the subset of CQL the read
/// model issues: `SELECT <* | col, ...> FROM <table> [WHERE col = ? [AND col = ?]...]`.
/// Anything else fails to prepare, like an unknown table or column would on a
/// real cluster.
#[derive(Clone)]
pub struct InMemorySession {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    tables: RwLock<HashMap<String, Table>>,
    prepare_calls: AtomicUsize,
    execute_calls: AtomicUsize,
    prepare_delay_ms: AtomicU64,
    failing_prepares: AtomicUsize,
    unavailable: AtomicBool,
}

struct Table {
    columns: Vec<&'static str>,
    rows: Vec<Row>,
}

impl Table {
    fn new(columns: &[&'static str]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| *c == name)
    }

    /// Inserts or replaces the row whose key columns match.
    fn upsert(&mut self, key: &[&str], row: Row) {
        let existing = self
            .rows
            .iter_mut()
            .find(|r| key.iter().all(|k| r.get(k) == row.get(k)));
        match existing {
            Some(slot) => *slot = row,
            None => self.rows.push(row),
        }
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySession {
    /// Creates a session with empty `video_ratings` and `video_ratings_by_user` tables.
    pub fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert(
            "video_ratings".to_string(),
            Table::new(&["videoid", "rating_counter", "rating_total"]),
        );
        tables.insert(
            "video_ratings_by_user".to_string(),
            Table::new(&["videoid", "userid", "rating"]),
        );

        Self {
            inner: Arc::new(Inner {
                tables: RwLock::new(tables),
                ..Inner::default()
            }),
        }
    }

    /// Makes every `prepare` call sleep before answering.
    pub fn with_prepare_delay(self, delay: Duration) -> Self {
        self.inner
            .prepare_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
        self
    }

    /// Sets the tally row of a video.
    pub async fn set_video_rating(&self, video_id: VideoId, count: i64, total: i64) {
        let row = Row::new()
            .with("videoid", video_id)
            .with("rating_counter", Value::Counter(count))
            .with("rating_total", Value::Counter(total));
        self.upsert("video_ratings", &["videoid"], row).await;
    }

    /// Sets the rating a user gave a video.
    pub async fn set_user_rating(&self, video_id: VideoId, user_id: UserId, rating: i32) {
        let row = Row::new()
            .with("videoid", video_id)
            .with("userid", user_id)
            .with("rating", rating);
        self.upsert("video_ratings_by_user", &["videoid", "userid"], row)
            .await;
    }

    /// Appends a raw row to a table, bypassing key uniqueness.
    ///
    /// Returns false if the table does not exist.
    pub async fn insert_row(&self, table: &str, row: Row) -> bool {
        match self.inner.tables.write().await.get_mut(table) {
            Some(table) => {
                table.rows.push(row);
                true
            }
            None => false,
        }
    }

    /// Removes all rows from all tables.
    pub async fn clear(&self) {
        for table in self.inner.tables.write().await.values_mut() {
            table.rows.clear();
        }
    }

    /// Makes the next `n` preparations fail.
    pub fn fail_next_prepares(&self, n: usize) {
        self.inner.failing_prepares.store(n, Ordering::SeqCst);
    }

    /// Simulates losing (or regaining) connectivity to the cluster.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns how many times `prepare` was called.
    pub fn prepare_count(&self) -> usize {
        self.inner.prepare_calls.load(Ordering::SeqCst)
    }

    /// Returns how many times `execute` was called.
    pub fn execute_count(&self) -> usize {
        self.inner.execute_calls.load(Ordering::SeqCst)
    }

    async fn upsert(&self, table: &str, key: &[&str], row: Row) {
        if let Some(table) = self.inner.tables.write().await.get_mut(table) {
            table.upsert(key, row);
        }
    }

    fn take_prepare_failure(&self) -> bool {
        self.inner
            .failing_prepares
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn check_available(&self) -> Result<()> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(RatingsError::Unavailable(
                "no hosts available in the cluster".to_string(),
            ));
        }
        Ok(())
    }
}

/// A statement prepared by [`InMemorySession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStatement {
    select: Select,
}

impl InMemoryStatement {
    /// Number of `?` placeholders.
    pub fn placeholders(&self) -> usize {
        self.select.filters.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Projection {
    All,
    Columns(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Select {
    projection: Projection,
    table: String,
    filters: Vec<String>,
}

impl Select {
    fn parse(query: &str) -> std::result::Result<Self, String> {
        let normalized = query.trim().trim_end_matches(';').replace(',', " , ");
        let mut tokens = normalized.split_whitespace().peekable();

        expect_keyword(tokens.next(), "SELECT")?;

        let projection = if tokens.peek() == Some(&"*") {
            tokens.next();
            Projection::All
        } else {
            let mut columns = vec![identifier(tokens.next())?];
            while tokens.peek() == Some(&",") {
                tokens.next();
                columns.push(identifier(tokens.next())?);
            }
            Projection::Columns(columns)
        };

        expect_keyword(tokens.next(), "FROM")?;
        let table = identifier(tokens.next())?;

        let mut filters = Vec::new();
        if tokens.peek().is_some() {
            expect_keyword(tokens.next(), "WHERE")?;
            loop {
                filters.push(identifier(tokens.next())?);
                expect_token(tokens.next(), "=")?;
                expect_token(tokens.next(), "?")?;
                match tokens.next() {
                    None => break,
                    Some(token) if token.eq_ignore_ascii_case("AND") => continue,
                    Some(token) => return Err(format!("unexpected token `{token}`")),
                }
            }
        }

        Ok(Self {
            projection,
            table,
            filters,
        })
    }

    fn columns(&self) -> impl Iterator<Item = &str> {
        let selected: &[String] = match &self.projection {
            Projection::All => &[],
            Projection::Columns(columns) => columns,
        };
        selected
            .iter()
            .chain(self.filters.iter())
            .map(String::as_str)
    }

    fn project(&self, table: &Table, row: &Row) -> Row {
        let columns: Vec<&str> = match &self.projection {
            Projection::All => table.columns.clone(),
            Projection::Columns(columns) => columns.iter().map(String::as_str).collect(),
        };
        columns
            .into_iter()
            .map(|name| (name, row.get(name).cloned().unwrap_or(Value::Null)))
            .collect()
    }
}

fn expect_keyword(token: Option<&str>, keyword: &str) -> std::result::Result<(), String> {
    match token {
        Some(t) if t.eq_ignore_ascii_case(keyword) => Ok(()),
        Some(t) => Err(format!("expected {keyword}, found `{t}`")),
        None => Err(format!("expected {keyword}, found end of query")),
    }
}

fn expect_token(token: Option<&str>, expected: &str) -> std::result::Result<(), String> {
    match token {
        Some(t) if t == expected => Ok(()),
        Some(t) => Err(format!("expected `{expected}`, found `{t}`")),
        None => Err(format!("expected `{expected}`, found end of query")),
    }
}

fn identifier(token: Option<&str>) -> std::result::Result<String, String> {
    match token {
        Some(t) if !t.is_empty() && t.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
            Ok(t.to_ascii_lowercase())
        }
        Some(t) => Err(format!("expected identifier, found `{t}`")),
        None => Err("expected identifier, found end of query".to_string()),
    }
}

#[async_trait]
impl Session for InMemorySession {
    type Prepared = InMemoryStatement;

    async fn prepare(&self, query: &str) -> Result<InMemoryStatement> {
        self.inner.prepare_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.inner.prepare_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.check_available()?;

        let prepare_error = |reason: String| RatingsError::Prepare {
            query: query.to_string(),
            reason,
        };

        if self.take_prepare_failure() {
            return Err(prepare_error("injected failure".to_string()));
        }

        let select = Select::parse(query).map_err(prepare_error)?;

        let tables = self.inner.tables.read().await;
        let table = tables
            .get(&select.table)
            .ok_or_else(|| prepare_error(format!("unconfigured table {}", select.table)))?;
        if let Some(column) = select.columns().find(|c| !table.has_column(c)) {
            return Err(prepare_error(format!("undefined column name {column}")));
        }

        Ok(InMemoryStatement { select })
    }

    async fn execute(&self, statement: BoundStatement<'_, InMemoryStatement>) -> Result<RowSet> {
        self.inner.execute_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let select = &statement.prepared().select;
        let values = statement.values();
        if values.len() != select.filters.len() {
            return Err(RatingsError::BindMismatch {
                expected: select.filters.len(),
                actual: values.len(),
            });
        }

        let tables = self.inner.tables.read().await;
        let Some(table) = tables.get(&select.table) else {
            return Ok(RowSet::empty());
        };

        let rows = table
            .rows
            .iter()
            .filter(|row| {
                select
                    .filters
                    .iter()
                    .zip(values)
                    .all(|(column, value)| row.get(column) == Some(value))
            })
            .map(|row| select.project(table, row))
            .collect();

        Ok(RowSet::new(rows))
    }
}
