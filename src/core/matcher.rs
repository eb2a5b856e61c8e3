use futures::stream::{self, StreamExt};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{
    distance::GeoScorer,
    language::LanguageScorer,
    scoring::{calculate_match_score, SignalScores},
    skills::SkillSimilarityScorer,
    trust::TrustScorer,
};
use crate::error::MatchError;
use crate::models::{MatchConfig, MatchResult, MatchScore, Profile, WeightVector};
use crate::services::EmbeddingHandle;

/// Ranked results plus the counts a caller needs to tell an empty pool from a failed one
#[derive(Debug, Clone, Default)]
pub struct MatchBatch {
    pub results: Vec<MatchResult>,
    /// Candidates supplied, including the subject itself if present
    pub total_candidates: usize,
    /// Candidates that produced a score (before filtering and truncation)
    pub scored_candidates: usize,
    /// Candidates dropped because they could not be scored
    pub skipped_candidates: usize,
}

/// Main matching orchestrator
///
/// # Pipeline
/// 1. Skip the subject's own profile
/// 2. Score each candidate on five signals (both skill directions, geo, language, trust)
/// 3. Combine with the configured weights and apply the boost floor
/// 4. Filter by minimum score, sort descending, truncate
///
/// Public entry points never fail; candidates that cannot be scored are logged
/// and left out.
#[derive(Debug, Clone)]
pub struct MatchingEngine {
    skills: SkillSimilarityScorer,
    geo: GeoScorer,
    language: LanguageScorer,
    trust: TrustScorer,
}

impl MatchingEngine {
    pub fn new(embeddings: Arc<EmbeddingHandle>) -> Self {
        Self {
            skills: SkillSimilarityScorer::new(embeddings),
            geo: GeoScorer,
            language: LanguageScorer,
            trust: TrustScorer,
        }
    }

    /// Engine relying on exact, containment and token matching only
    pub fn without_embeddings() -> Self {
        Self::new(Arc::new(EmbeddingHandle::disabled()))
    }

    pub fn skills(&self) -> &SkillSimilarityScorer {
        &self.skills
    }

    /// Compatibility of `candidate` for `subject`
    pub async fn score(&self, subject: &Profile, candidate: &Profile, weights: &WeightVector) -> MatchScore {
        let offer_to_want = self
            .skills
            .directional_aggregate(&subject.offers, &candidate.wants)
            .await;
        let want_to_offer = self
            .skills
            .directional_aggregate(&candidate.offers, &subject.wants)
            .await;

        let signals = SignalScores {
            offer_to_want,
            want_to_offer,
            geo: self.geo.score(subject.location.as_ref(), candidate.location.as_ref()),
            language: self.language.score(subject, candidate),
            trust: self.trust.score(subject, candidate),
        };

        if !signals.geo.is_available() || !signals.language.is_available() || !signals.trust.is_available() {
            tracing::trace!("Neutral defaults used for {} -> {}: {:?}", subject.id, candidate.id, signals);
        }

        calculate_match_score(&signals, weights)
    }

    async fn score_candidate(
        &self,
        subject: &Profile,
        candidate: &Profile,
        weights: &WeightVector,
    ) -> Result<MatchScore, MatchError> {
        candidate.check()?;
        Ok(self.score(subject, candidate, weights).await)
    }

    /// Find the best partners for `subject` among `candidates`
    pub async fn find_matches(
        &self,
        subject: &Profile,
        candidates: &[Profile],
        config: &MatchConfig,
    ) -> Vec<MatchResult> {
        self.find_matches_with_stats(subject, candidates, config)
            .await
            .results
    }

    /// [`find_matches`](Self::find_matches) with attempted/scored counts
    pub async fn find_matches_with_stats(
        &self,
        subject: &Profile,
        candidates: &[Profile],
        config: &MatchConfig,
    ) -> MatchBatch {
        let total_candidates = candidates.len();

        if let Err(e) = subject.check() {
            tracing::error!("Cannot match for invalid subject: {}", e);
            return MatchBatch {
                total_candidates,
                skipped_candidates: total_candidates,
                ..MatchBatch::default()
            };
        }

        let weights = config.weights.sanitized();
        let min_score = if config.min_match_score.is_finite() {
            config.min_match_score
        } else {
            0.0
        };
        let timestamp = chrono::Utc::now();

        // Order is preserved so ties keep their input order after the stable sort
        let scored: Vec<Option<MatchResult>> = stream::iter(candidates.iter().filter(|c| c.id != subject.id))
            .map(|candidate| async move {
                match self.score_candidate(subject, candidate, &weights).await {
                    Ok(score) => {
                        tracing::debug!("Scored {} -> {}: {:.3}", subject.id, candidate.id, score.total);
                        Some(MatchResult {
                            subject_id: subject.id.clone(),
                            candidate_id: candidate.id.clone(),
                            score,
                            timestamp,
                        })
                    }
                    Err(e) => {
                        tracing::warn!("Skipping candidate for {}: {}", subject.id, e);
                        None
                    }
                }
            })
            .buffered(config.concurrency.max(1))
            .collect()
            .await;

        let attempted = scored.len();
        let mut results: Vec<MatchResult> = scored.into_iter().flatten().collect();
        let scored_candidates = results.len();

        results.retain(|r| r.score.total >= min_score);

        // Sort by total score (descending); sort_by is stable
        results.sort_by(|a, b| {
            b.score
                .total
                .partial_cmp(&a.score.total)
                .unwrap_or(Ordering::Equal)
        });

        results.truncate(config.max_results);

        tracing::info!(
            "Returning {} matches for {} (scored {} of {} candidates)",
            results.len(),
            subject.id,
            scored_candidates,
            total_candidates
        );

        MatchBatch {
            results,
            total_candidates,
            scored_candidates,
            skipped_candidates: attempted - scored_candidates,
        }
    }

    /// [`find_matches_with_stats`](Self::find_matches_with_stats) keeping only candidates
    /// that pass [`validate_bidirectional`](Self::validate_bidirectional) at `min_score`
    ///
    /// The mutual filter runs on the full ranking, before `max_results` is applied.
    pub async fn find_mutual_matches(
        &self,
        subject: &Profile,
        candidates: &[Profile],
        config: &MatchConfig,
        min_score: f64,
    ) -> MatchBatch {
        let unbounded = MatchConfig {
            max_results: candidates.len(),
            ..*config
        };
        let mut batch = self.find_matches_with_stats(subject, candidates, &unbounded).await;

        let by_id: HashMap<&str, &Profile> = candidates
            .iter()
            .rev()
            .map(|c| (c.id.as_str(), c))
            .collect();

        let mut mutual = Vec::with_capacity(batch.results.len().min(config.max_results));
        for result in batch.results {
            if mutual.len() == config.max_results {
                break;
            }
            let Some(candidate) = by_id.get(result.candidate_id.as_str()) else {
                continue;
            };
            if self.validate_bidirectional(subject, candidate, min_score).await {
                mutual.push(result);
            }
        }

        tracing::info!(
            "Kept {} mutual matches for {} at minimum {:.2}",
            mutual.len(),
            subject.id,
            min_score
        );

        batch.results = mutual;
        batch
    }

    /// True when both skill directions individually reach `min_score`
    pub async fn validate_bidirectional(&self, subject: &Profile, candidate: &Profile, min_score: f64) -> bool {
        if subject.id == candidate.id {
            return false;
        }

        let offer_to_want = self
            .skills
            .directional_aggregate(&subject.offers, &candidate.wants)
            .await;
        if offer_to_want < min_score {
            return false;
        }

        let want_to_offer = self
            .skills
            .directional_aggregate(&candidate.offers, &subject.wants)
            .await;
        want_to_offer >= min_score
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::without_embeddings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Location, Skill, SkillLevel};

    fn expert(name: &str) -> Skill {
        Skill::new(name, SkillLevel::Expert)
    }

    fn create_candidate(id: &str, offers: &[&str], wants: &[&str]) -> Profile {
        let mut profile = Profile::new(id);
        profile.offers = offers.iter().map(|s| expert(s)).collect();
        profile.wants = wants.iter().map(|s| expert(s)).collect();
        profile
    }

    fn create_subject() -> Profile {
        create_candidate("subject", &["JavaScript"], &["Python"])
    }

    #[tokio::test]
    async fn test_perfect_swap() {
        let engine = MatchingEngine::without_embeddings();
        let candidate = create_candidate("c1", &["Python"], &["JavaScript"]);

        let score = engine
            .score(&create_subject(), &candidate, &WeightVector::default())
            .await;

        assert_eq!(score.offer_to_want, 1.0);
        assert_eq!(score.want_to_offer, 1.0);
        assert!(score.total >= 0.8);
    }

    #[tokio::test]
    async fn test_no_wanted_skills() {
        let engine = MatchingEngine::without_embeddings();
        let candidate = create_candidate("c1", &["Python"], &[]);

        let score = engine
            .score(&create_subject(), &candidate, &WeightVector::default())
            .await;

        assert_eq!(score.offer_to_want, 0.0);
    }

    #[tokio::test]
    async fn test_find_matches_skips_self() {
        let engine = MatchingEngine::without_embeddings();
        let subject = create_subject();
        let candidates = vec![
            create_candidate("c1", &["Python"], &["JavaScript"]),
            subject.clone(),
            create_candidate("c2", &["Go"], &["Rust"]),
        ];

        let results = engine
            .find_matches(&subject, &candidates, &MatchConfig::default())
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.candidate_id != "subject"));
        assert_eq!(results[0].candidate_id, "c1");
    }

    #[tokio::test]
    async fn test_respects_limit() {
        let engine = MatchingEngine::without_embeddings();
        let subject = create_subject();
        let candidates: Vec<Profile> = (0..20)
            .map(|i| create_candidate(&i.to_string(), &["Python"], &["JavaScript"]))
            .collect();
        let config = MatchConfig {
            max_results: 5,
            ..MatchConfig::default()
        };

        let results = engine.find_matches(&subject, &candidates, &config).await;

        assert_eq!(results.len(), 5);
    }

    #[tokio::test]
    async fn test_min_match_score_filters() {
        let engine = MatchingEngine::without_embeddings();
        let subject = create_subject();
        let candidates = vec![
            create_candidate("good", &["Python"], &["JavaScript"]),
            create_candidate("poor", &["Knitting"], &["Chess"]),
        ];
        let config = MatchConfig {
            min_match_score: 0.6,
            ..MatchConfig::default()
        };

        let results = engine.find_matches(&subject, &candidates, &config).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].candidate_id, "good");
    }

    #[tokio::test]
    async fn test_ties_keep_input_order() {
        let engine = MatchingEngine::without_embeddings();
        let subject = create_subject();
        let candidates: Vec<Profile> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| create_candidate(id, &["Python"], &["JavaScript"]))
            .collect();

        let results = engine
            .find_matches(&subject, &candidates, &MatchConfig::default())
            .await;

        let ids: Vec<&str> = results.iter().map(|r| r.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_invalid_candidate_skipped() {
        let engine = MatchingEngine::without_embeddings();
        let subject = create_subject();
        let candidates = vec![
            create_candidate("ok", &["Python"], &["JavaScript"]),
            create_candidate("bad", &["Python"], &["JavaScript"]).trusted(7.0),
            create_candidate("", &["Python"], &["JavaScript"]),
        ];

        let batch = engine
            .find_matches_with_stats(&subject, &candidates, &MatchConfig::default())
            .await;

        assert_eq!(batch.results.len(), 1);
        assert_eq!(batch.total_candidates, 3);
        assert_eq!(batch.scored_candidates, 1);
        assert_eq!(batch.skipped_candidates, 2);
    }

    #[tokio::test]
    async fn test_invalid_subject_returns_empty() {
        let engine = MatchingEngine::without_embeddings();
        let subject = create_subject().at(Location::coordinates(200.0, 0.0));
        let candidates = vec![create_candidate("c1", &["Python"], &["JavaScript"])];

        let batch = engine
            .find_matches_with_stats(&subject, &candidates, &MatchConfig::default())
            .await;

        assert!(batch.results.is_empty());
        assert_eq!(batch.skipped_candidates, 1);
    }

    #[tokio::test]
    async fn test_mutual_filter_runs_before_limit() {
        let engine = MatchingEngine::without_embeddings();
        let subject = create_subject();
        let mutual = |id: &str| {
            create_candidate(id, &[], &["JavaScript"])
                .offering(Skill::new("Python", SkillLevel::Beginner))
                .speaking(&["Portuguese"])
                .trusted(0.0)
        };
        // One-way candidates outrank the mutual ones (0.625, 0.615 vs 0.6)
        let candidates = vec![
            create_candidate("one_way_a", &["Cooking"], &["JavaScript"]).trusted(1.0),
            create_candidate("one_way_b", &["Cooking"], &["JavaScript"]).trusted(0.9),
            mutual("mutual_c"),
            mutual("mutual_d"),
            mutual("mutual_e"),
        ];
        let config = MatchConfig {
            max_results: 2,
            ..MatchConfig::default()
        };

        let ranked = engine.find_matches(&subject, &candidates, &config).await;
        let ranked_ids: Vec<&str> = ranked.iter().map(|r| r.candidate_id.as_str()).collect();
        assert_eq!(ranked_ids, vec!["one_way_a", "one_way_b"]);

        let batch = engine
            .find_mutual_matches(&subject, &candidates, &config, 0.3)
            .await;
        let ids: Vec<&str> = batch.results.iter().map(|r| r.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["mutual_c", "mutual_d"]);
        assert_eq!(batch.scored_candidates, 5);
    }

    #[tokio::test]
    async fn test_validate_bidirectional() {
        let engine = MatchingEngine::without_embeddings();
        let subject = create_subject();

        let mutual = create_candidate("c1", &["Python"], &["JavaScript"]);
        let one_way = create_candidate("c2", &["Cooking"], &["JavaScript"]);

        assert!(engine.validate_bidirectional(&subject, &mutual, 0.3).await);
        assert!(!engine.validate_bidirectional(&subject, &one_way, 0.3).await);
        assert!(!engine.validate_bidirectional(&subject, &subject, 0.0).await);
    }
}
