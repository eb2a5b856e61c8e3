use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::EmbeddingSettings;
use crate::error::EmbeddingError;
use crate::services::cache::EmbeddingCache;
use crate::services::http_embedder::HttpEmbeddingClient;

/// A text→vector function supplied by an external provider
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Prepare the provider (load a model, probe an endpoint)
    async fn initialize(&self) -> Result<(), EmbeddingError>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Readiness {
    Ready,
    Unavailable,
}

/// Shared, lazily initialized handle to the embedding provider
///
/// The first caller triggers initialization; concurrent first callers wait on the
/// same attempt. A failed or timed-out initialization marks the handle unavailable
/// for its whole lifetime, and every caller falls back to lexical matching.
/// Vectors are L2-normalized and memoized per text.
pub struct EmbeddingHandle {
    provider: Option<Arc<dyn EmbeddingProvider>>,
    readiness: OnceCell<Readiness>,
    cache: EmbeddingCache,
    call_timeout: Duration,
    init_timeout: Duration,
}

impl std::fmt::Debug for EmbeddingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingHandle")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("readiness", &self.readiness.get())
            .field("call_timeout", &self.call_timeout)
            .field("init_timeout", &self.init_timeout)
            .finish()
    }
}

impl EmbeddingHandle {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        cache: EmbeddingCache,
        call_timeout: Duration,
        init_timeout: Duration,
    ) -> Self {
        Self {
            provider: Some(provider),
            readiness: OnceCell::new(),
            cache,
            call_timeout,
            init_timeout,
        }
    }

    /// Handle with default cache size and timeouts
    pub fn with_provider(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::new(
            provider,
            EmbeddingCache::new(10_000, 3600),
            Duration::from_millis(2000),
            Duration::from_millis(5000),
        )
    }

    /// Handle that never produces vectors
    pub fn disabled() -> Self {
        Self {
            provider: None,
            readiness: OnceCell::new_with(Some(Readiness::Unavailable)),
            cache: EmbeddingCache::new(1, 1),
            call_timeout: Duration::ZERO,
            init_timeout: Duration::ZERO,
        }
    }

    /// Build the handle described by the settings; disabled when embeddings are off
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self, EmbeddingError> {
        if !settings.enabled {
            tracing::info!("Embeddings disabled, skill matching uses lexical fallback only");
            return Ok(Self::disabled());
        }

        let client = HttpEmbeddingClient::new(
            settings.endpoint.clone(),
            settings.api_key.clone(),
            settings.model.clone(),
            Duration::from_millis(settings.timeout_ms),
        )?;

        Ok(Self::new(
            Arc::new(client),
            EmbeddingCache::new(settings.cache_size, settings.cache_ttl_secs),
            Duration::from_millis(settings.timeout_ms),
            Duration::from_millis(settings.init_timeout_ms),
        ))
    }

    /// Initialize the provider once; returns whether it is usable
    pub async fn initialize(&self) -> bool {
        let readiness = self
            .readiness
            .get_or_init(|| async {
                let Some(provider) = &self.provider else {
                    return Readiness::Unavailable;
                };

                match tokio::time::timeout(self.init_timeout, provider.initialize()).await {
                    Ok(Ok(())) => {
                        tracing::info!("Embedding provider {} ready", provider.name());
                        Readiness::Ready
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(
                            "Embedding provider {} failed to initialize, using lexical fallback: {}",
                            provider.name(),
                            e
                        );
                        Readiness::Unavailable
                    }
                    Err(_) => {
                        tracing::warn!(
                            "Embedding provider {} initialization timed out after {:?}",
                            provider.name(),
                            self.init_timeout
                        );
                        Readiness::Unavailable
                    }
                }
            })
            .await;

        *readiness == Readiness::Ready
    }

    /// True once initialization has completed successfully
    pub fn is_ready(&self) -> bool {
        matches!(self.readiness.get(), Some(Readiness::Ready))
    }

    /// Normalized embedding for `text`, initializing the provider on first use
    pub async fn embed(&self, text: &str) -> Result<Arc<Vec<f32>>, EmbeddingError> {
        if !self.initialize().await {
            return Err(EmbeddingError::Unavailable);
        }
        let provider = self.provider.as_ref().ok_or(EmbeddingError::NotInitialized)?;
        let call_timeout = self.call_timeout;

        self.cache
            .get_or_try_insert(text, async move {
                let raw = tokio::time::timeout(call_timeout, provider.embed(text))
                    .await
                    .map_err(|_| EmbeddingError::Timeout(call_timeout.as_millis() as u64))??;
                normalize(raw).map(Arc::new)
            })
            .await
            .map_err(EmbeddingError::Shared)
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }
}

/// Scale a vector to unit length
pub fn normalize(mut vector: Vec<f32>) -> Result<Vec<f32>, EmbeddingError> {
    if vector.is_empty() {
        return Err(EmbeddingError::InvalidResponse("empty embedding".into()));
    }
    if vector.iter().any(|v| !v.is_finite()) {
        return Err(EmbeddingError::InvalidResponse("non-finite embedding value".into()));
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return Err(EmbeddingError::InvalidResponse("zero-norm embedding".into()));
    }
    for v in &mut vector {
        *v /= norm;
    }
    Ok(vector)
}

/// Cosine similarity of two normalized vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch(a.len(), b.len()));
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    Ok(dot as f64)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider backed by a fixed text→vector table
    #[derive(Default)]
    pub struct StaticProvider {
        pub vectors: HashMap<String, Vec<f32>>,
        pub fail_init: bool,
        pub init_delay_ms: u64,
        pub embed_delay_ms: u64,
        pub init_calls: AtomicUsize,
        pub embed_calls: AtomicUsize,
    }

    impl StaticProvider {
        pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
            self.vectors.insert(text.to_string(), vector);
            self
        }
    }

    #[async_trait]
    impl EmbeddingProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        async fn initialize(&self) -> Result<(), EmbeddingError> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            if self.init_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.init_delay_ms)).await;
            }
            if self.fail_init {
                return Err(EmbeddingError::ApiError("model missing".into()));
            }
            Ok(())
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.embed_calls.fetch_add(1, Ordering::SeqCst);
            if self.embed_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.embed_delay_ms)).await;
            }
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| EmbeddingError::ApiError(format!("no vector for {text:?}")))
        }
    }
}
