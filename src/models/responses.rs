use serde::{Deserialize, Serialize};
use crate::models::domain::MatchResult;

/// Ranked matches for one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub matches: Vec<MatchResult>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "scoredCandidates")]
    pub scored_candidates: usize,
    #[serde(rename = "generatedAt")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Similarity between two skill names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResponse {
    pub left: String,
    pub right: String,
    pub score: f64,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
