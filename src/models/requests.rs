use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{MatchConfig, Profile, WeightVector};

/// Request to rank candidates for a subject
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    pub subject: Profile,
    #[serde(default)]
    pub candidates: Vec<Profile>,
    #[serde(default)]
    pub weights: Option<WeightVector>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(alias = "min_match_score", rename = "minMatchScore", default)]
    pub min_match_score: Option<f64>,
    #[validate(range(min = 1, max = 1000))]
    #[serde(alias = "max_results", rename = "maxResults", default)]
    pub max_results: Option<usize>,
}

impl MatchRequest {
    /// Merge request overrides into the configured defaults
    pub fn config(&self, defaults: &MatchConfig) -> MatchConfig {
        MatchConfig {
            weights: self.weights.unwrap_or(defaults.weights),
            min_match_score: self.min_match_score.unwrap_or(defaults.min_match_score),
            max_results: self.max_results.unwrap_or(defaults.max_results),
            concurrency: defaults.concurrency,
        }
    }
}
