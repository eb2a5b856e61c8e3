//! SwapMatch - compatibility ranking for skill-exchange partners
//!
//! Given a subject profile and a pool of candidates, the engine scores each
//! candidate on five signals (skill fit in both directions, proximity, shared
//! languages, trust), combines them with configurable weights and returns a
//! ranked, truncated list with the full score breakdown.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchBatch, MatchingEngine, SkillSimilarityScorer, haversine_distance};
pub use error::{EmbeddingError, MatchError};
pub use models::{MatchConfig, MatchResult, MatchScore, Profile, Skill, SkillLevel, WeightVector};
pub use services::{EmbeddingHandle, EmbeddingProvider};
