use std::sync::Arc;
use thiserror::Error;

/// Errors raised while scoring a single candidate
///
/// These never escape the engine's public entry points; the candidate is logged
/// and dropped instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("Invalid profile {id:?}: {reason}")]
    InvalidProfile { id: String, reason: String },
}

/// Errors that can occur when talking to the embedding provider
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding provider not initialized")]
    NotInitialized,

    #[error("Embedding provider unavailable")]
    Unavailable,

    #[error("Embedding request timed out after {0}ms")]
    Timeout(u64),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Embedding dimension mismatch: {0} vs {1}")]
    DimensionMismatch(usize, usize),

    /// Failure of a lookup shared by concurrent callers for the same text
    #[error(transparent)]
    Shared(Arc<EmbeddingError>),
}
