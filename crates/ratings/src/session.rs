use async_trait::async_trait;

use crate::{Result, RowSet, Value};

/// A prepared statement with its positional parameters bound.
#[derive(Debug)]
pub struct BoundStatement<'a, P> {
    prepared: &'a P,
    values: Vec<Value>,
}

impl<'a, P> BoundStatement<'a, P> {
    /// Binds values to a prepared statement in placeholder order.
    pub fn new(prepared: &'a P, values: Vec<Value>) -> Self {
        Self { prepared, values }
    }

    pub fn prepared(&self) -> &'a P {
        self.prepared
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// An open connection to the cluster.
///
/// A session prepares query templates and executes bound statements.
/// Pooling, reconnection and timeouts belong to the implementation.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Session: Send + Sync {
    /// Handle to a prepared query template.
    type Prepared: Send + Sync + 'static;

    /// Parses and registers a query template for repeated execution.
    async fn prepare(&self, query: &str) -> Result<Self::Prepared>;

    /// Executes a bound statement, returning zero or more rows.
    async fn execute(&self, statement: BoundStatement<'_, Self::Prepared>) -> Result<RowSet>;
}
