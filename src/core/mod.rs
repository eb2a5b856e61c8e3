// Core algorithm exports
pub mod boost;
pub mod distance;
pub mod language;
pub mod matcher;
pub mod scoring;
pub mod signal;
pub mod skills;
pub mod trust;

pub use boost::{apply_boost, boost_floor};
pub use distance::{distance_band_score, haversine_distance, GeoScorer};
pub use language::LanguageScorer;
pub use matcher::{MatchBatch, MatchingEngine};
pub use scoring::{calculate_match_score, SignalScores};
pub use signal::{Signal, NEUTRAL_SCORE};
pub use skills::{lexical_similarity, SkillMatch, SkillSimilarityScorer};
pub use trust::TrustScorer;
