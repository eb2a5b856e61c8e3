use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::EmbeddingError;

/// In-memory memo of embedding vectors keyed by their source text
///
/// Concurrent lookups of the same missing key share a single provider call.
/// Failed lookups are not cached, so a later call can succeed.
#[derive(Clone)]
pub struct EmbeddingCache {
    vectors: moka::future::Cache<String, Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    /// Create a new cache holding at most `capacity` vectors for `ttl_secs`
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let vectors = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { vectors }
    }

    /// Get a cached vector
    pub async fn get(&self, text: &str) -> Option<Arc<Vec<f32>>> {
        let hit = self.vectors.get(&CacheKey::embedding(text)).await;
        if hit.is_some() {
            tracing::trace!("Embedding cache hit: {}", text);
        }
        hit
    }

    /// Get a cached vector or compute it with `init`
    pub async fn get_or_try_insert<F>(
        &self,
        text: &str,
        init: F,
    ) -> Result<Arc<Vec<f32>>, Arc<EmbeddingError>>
    where
        F: Future<Output = Result<Arc<Vec<f32>>, EmbeddingError>>,
    {
        self.vectors.try_get_with(CacheKey::embedding(text), init).await
    }

    /// Drop every cached vector
    pub fn clear(&self) {
        self.vectors.invalidate_all();
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.vectors.run_pending_tasks().await;
        CacheStats {
            entries: self.vectors.entry_count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for an embedding source text
    pub fn embedding(text: &str) -> String {
        format!("embedding:{}", text)
    }
}
