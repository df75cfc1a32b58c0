//! Graph adapter error types.

use thiserror::Error;

/// Errors raised below the [`GraphReader`](super::GraphReader) boundary.
///
/// None of these reach callers of the reader; they are logged and turned
/// into [`Fetched::Unavailable`](super::Fetched::Unavailable).
#[derive(Debug, Error)]
pub enum GraphError {
    /// No graph URI configured.
    #[error("Graph database not configured")]
    NotConfigured,

    /// The reader has no live connection.
    #[error("Graph database unavailable")]
    Unavailable,

    /// Connection or query error reported by the driver.
    #[error("Database error: {0}")]
    Database(String),

    /// A row did not match the record declared for its statement.
    #[error("Unexpected row shape from {statement}: {message}")]
    Decode {
        statement: &'static str,
        message: String,
    },
}

impl From<neo4rs::Error> for GraphError {
    fn from(err: neo4rs::Error) -> Self {
        GraphError::Database(err.to_string())
    }
}
