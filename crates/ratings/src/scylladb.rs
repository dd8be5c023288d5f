use std::sync::Arc;

use async_trait::async_trait;
use scylla::client::session::Session as DriverSession;
use scylla::client::session_builder::SessionBuilder;
use scylla::statement::prepared::PreparedStatement;
use scylla::value::{Counter, CqlValue, Row as DriverRow};

use crate::{BoundStatement, Result, Row, RowSet, Session, Value};

/// Connection settings for a Cassandra/ScyllaDB cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScyllaConfig {
    /// Contact points as `host:port`.
    pub nodes: Vec<String>,
    /// Keyspace holding the ratings tables.
    pub keyspace: String,
}

impl Default for ScyllaConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["127.0.0.1:9042".to_string()],
            keyspace: "killrvideo".to_string(),
        }
    }
}

/// Session backed by the ScyllaDB driver.
///
/// Pooling, reconnection and load balancing are handled by the driver.
#[derive(Clone)]
pub struct ScyllaSession {
    session: Arc<DriverSession>,
}

impl ScyllaSession {
    /// Wraps an already connected driver session.
    pub fn new(session: Arc<DriverSession>) -> Self {
        Self { session }
    }

    /// Connects to the cluster and switches to the configured keyspace.
    pub async fn connect(config: &ScyllaConfig) -> Result<Self> {
        tracing::info!(nodes = ?config.nodes, keyspace = %config.keyspace, "connecting to cluster");
        let session = SessionBuilder::new()
            .known_nodes(&config.nodes)
            .use_keyspace(&config.keyspace, false)
            .build()
            .await?;
        Ok(Self::new(Arc::new(session)))
    }

    /// Gets a reference to the underlying driver session.
    pub fn inner(&self) -> &DriverSession {
        &self.session
    }
}

#[async_trait]
impl Session for ScyllaSession {
    type Prepared = PreparedStatement;

    async fn prepare(&self, query: &str) -> Result<PreparedStatement> {
        Ok(self.session.prepare(query).await?)
    }

    async fn execute(&self, statement: BoundStatement<'_, PreparedStatement>) -> Result<RowSet> {
        let values: Vec<Option<CqlValue>> = statement.values().iter().map(to_cql).collect();
        let result = self
            .session
            .execute_unpaged(statement.prepared(), values)
            .await?;

        let rows_result = result.into_rows_result()?;
        let names: Vec<String> = rows_result
            .column_specs()
            .iter()
            .map(|spec| spec.name().to_string())
            .collect();

        let mut rows = Vec::new();
        for row in rows_result.rows::<DriverRow>()? {
            let row = row?;
            rows.push(
                names
                    .iter()
                    .cloned()
                    .zip(row.columns.into_iter().map(from_cql))
                    .collect::<Row>(),
            );
        }

        Ok(RowSet::new(rows))
    }
}

fn to_cql(value: &Value) -> Option<CqlValue> {
    match value {
        Value::Uuid(v) => Some(CqlValue::Uuid(*v)),
        Value::Int(v) => Some(CqlValue::Int(*v)),
        Value::BigInt(v) => Some(CqlValue::BigInt(*v)),
        Value::Counter(v) => Some(CqlValue::Counter(Counter(*v))),
        Value::Text(v) => Some(CqlValue::Text(v.clone())),
        Value::Unsupported(_) | Value::Null => None,
    }
}

fn from_cql(value: Option<CqlValue>) -> Value {
    match value {
        None | Some(CqlValue::Empty) => Value::Null,
        Some(CqlValue::Uuid(v)) => Value::Uuid(v),
        Some(CqlValue::Int(v)) => Value::Int(v),
        Some(CqlValue::BigInt(v)) => Value::BigInt(v),
        Some(CqlValue::Counter(Counter(v))) => Value::Counter(v),
        Some(CqlValue::Text(v)) | Some(CqlValue::Ascii(v)) => Value::Text(v),
        Some(other) => Value::Unsupported(format!("{other:?}")),
    }
}
