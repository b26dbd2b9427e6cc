use uuid::Uuid;

/// Failure of a single node RPC sub-query. Folded into a default value by
/// the aggregator and never returned to its callers.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("node answered with HTTP {0}")]
    Status(u16),

    #[error("response body is not JSON: {0}")]
    Decode(String),
}

/// Errors reported by the node registry and its store backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("node {id} not found")]
    NotFound { id: Uuid },

    #[error("store rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unexpected store response: {0}")]
    Decode(String),

    #[error("{0} is not supported by the node registry")]
    Unsupported(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Input rejected at the boundary, before any network access.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid node URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },
}
