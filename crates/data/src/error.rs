//! Errors raised by source reads and writes.

/// Failure of a collaborator call.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Database driver error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Upstream service answered with a non-success status.
    #[error("upstream returned {status}: {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },
    /// Payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A stored record does not decode into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    /// A source read exceeded its time box.
    #[error("{source_name} timed out after {elapsed_ms} ms")]
    Timeout {
        /// Which source was being read.
        source_name: &'static str,
        /// Configured time box.
        elapsed_ms: u64,
    },
    /// A notification could not be delivered.
    #[error("publish failed: {0}")]
    Publish(String),
    /// The source is not reachable.
    #[error("source unavailable: {0}")]
    Unavailable(String),
}
