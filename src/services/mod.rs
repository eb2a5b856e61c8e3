// Service exports
pub mod cache;
pub mod embedding;
pub mod http_embedder;

pub use cache::{CacheKey, CacheStats, EmbeddingCache};
pub use embedding::{cosine_similarity, EmbeddingHandle, EmbeddingProvider};
pub use http_embedder::HttpEmbeddingClient;
