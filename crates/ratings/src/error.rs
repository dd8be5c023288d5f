use thiserror::Error;

/// Errors that can occur when reading ratings.
#[derive(Debug, Error)]
pub enum RatingsError {
    /// The read model was built without a session.
    #[error("A session is required to build the ratings read model")]
    MissingSession,

    /// A query template could not be prepared.
    #[error("Failed to prepare `{query}`: {reason}")]
    Prepare { query: String, reason: String },

    /// The number of bound values does not match the statement's placeholders.
    #[error("Statement expects {expected} bound values, got {actual}")]
    BindMismatch { expected: usize, actual: usize },

    /// The session could not reach the cluster.
    #[error("Session unavailable: {0}")]
    Unavailable(String),

    /// A lookup by primary key returned more than one row.
    #[error("Expected at most one row, found {0}")]
    UnexpectedRowCount(usize),

    /// A column was missing from a result row.
    #[error("Column not found in row: {0}")]
    MissingColumn(String),

    /// A column held a value of an unexpected type.
    #[error("Column {column} holds a {found} value, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The driver failed to open a session.
    #[error("Scylla session error: {0}")]
    NewSession(#[from] scylla::errors::NewSessionError),

    /// The driver failed to prepare a statement.
    #[error("Scylla prepare error: {0}")]
    ScyllaPrepare(#[from] scylla::errors::PrepareError),

    /// The driver failed to execute a statement.
    #[error("Scylla execution error: {0}")]
    ScyllaExecution(#[from] scylla::errors::ExecutionError),

    /// The response of an execution was not a rows result.
    #[error("Scylla result error: {0}")]
    IntoRows(#[from] scylla::errors::IntoRowsResultError),

    /// The rows of a result did not type-check.
    #[error("Scylla rows error: {0}")]
    Rows(#[from] scylla::errors::RowsError),

    /// A single row could not be deserialized.
    #[error("Scylla deserialization error: {0}")]
    Deserialization(#[from] scylla::errors::DeserializationError),
}

/// Result type for ratings operations.
pub type Result<T> = std::result::Result<T, RatingsError>;
