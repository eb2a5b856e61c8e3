use std::collections::HashSet;
use std::sync::Arc;

use crate::core::signal::clamp_unit;
use crate::error::EmbeddingError;
use crate::models::Skill;
use crate::services::embedding::{cosine_similarity, EmbeddingHandle};

/// Containment ratio above which two names count as near-exact
const NEAR_EXACT_RATIO: f64 = 0.8;
/// Ceiling for near-exact containment matches
const NEAR_EXACT_CAP: f64 = 0.95;
/// Lexical fallback score for strong containment
const STRONG_CONTAINMENT_SCORE: f64 = 0.9;
/// Lexical fallback score for any weaker containment
const WEAK_CONTAINMENT_SCORE: f64 = 0.7;
/// Raw similarity treated as an exact match when aggregating
const EXACT_MATCH_THRESHOLD: f64 = 0.99;

/// Best-scoring skill among a candidate list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillMatch<'a> {
    pub skill: &'a Skill,
    pub score: f64,
}

/// Compares skill names through an ordered cascade
///
/// # Cascade
/// 1. Exact match of normalized names
/// 2. Near-exact containment (one name inside the other, length ratio > 0.8)
/// 3. Cosine similarity of embeddings, when the provider is available
/// 4. Lexical fallback: weaker containment, then token-set Jaccard overlap
///
/// Each stage short-circuits when it produces a result.
#[derive(Debug, Clone)]
pub struct SkillSimilarityScorer {
    embeddings: Arc<EmbeddingHandle>,
}

impl SkillSimilarityScorer {
    pub fn new(embeddings: Arc<EmbeddingHandle>) -> Self {
        Self { embeddings }
    }

    /// Scorer that never consults an embedding provider
    pub fn lexical_only() -> Self {
        Self::new(Arc::new(EmbeddingHandle::disabled()))
    }

    /// Similarity of two skills in [0, 1]
    pub async fn similarity(&self, a: &Skill, b: &Skill) -> f64 {
        let name_a = normalize_name(&a.name);
        let name_b = normalize_name(&b.name);

        if name_a.is_empty() || name_b.is_empty() {
            return 0.0;
        }

        // Stage 1: exact
        if name_a == name_b {
            return 1.0;
        }

        // Stage 2: near-exact containment
        if let Some(ratio) = containment_ratio(&name_a, &name_b) {
            if ratio > NEAR_EXACT_RATIO {
                return ratio.min(NEAR_EXACT_CAP);
            }
        }

        // Stage 3: embeddings
        match self.embedding_similarity(a, b).await {
            Ok(score) => return score,
            Err(EmbeddingError::Unavailable) => {}
            Err(e) => {
                tracing::debug!(
                    "Embedding similarity failed for {:?} / {:?}, using lexical fallback: {}",
                    a.name,
                    b.name,
                    e
                );
            }
        }

        // Stage 4: lexical
        lexical_similarity(&name_a, &name_b)
    }

    async fn embedding_similarity(&self, a: &Skill, b: &Skill) -> Result<f64, EmbeddingError> {
        let vector_a = self.embeddings.embed(&skill_text(a)).await?;
        let vector_b = self.embeddings.embed(&skill_text(b)).await?;
        cosine_similarity(&vector_a, &vector_b).map(clamp_unit)
    }

    /// Highest-scoring skill in `candidates`; ties keep the first seen
    pub async fn best_match<'a>(&self, target: &Skill, candidates: &'a [Skill]) -> Option<SkillMatch<'a>> {
        let mut best: Option<SkillMatch<'a>> = None;

        for skill in candidates {
            let score = self.similarity(target, skill).await;
            if best.map_or(true, |b| score > b.score) {
                best = Some(SkillMatch { skill, score });
            }
        }

        best
    }

    /// How well `offers` covers `wants`, in one direction
    ///
    /// Each offered skill is matched to its best wanted skill and weighted by the
    /// offering level. The result blends mean and max of those weighted scores
    /// (0.7 mean + 0.3 max), switching to 0.8 max + 0.2 mean when any raw
    /// similarity reaches exact-match strength.
    pub async fn directional_aggregate(&self, offers: &[Skill], wants: &[Skill]) -> f64 {
        if offers.is_empty() || wants.is_empty() {
            return 0.0;
        }

        let mut weighted = Vec::with_capacity(offers.len());
        let mut exact_match = false;

        for offer in offers {
            let Some(best) = self.best_match(offer, wants).await else {
                continue;
            };
            if best.score >= EXACT_MATCH_THRESHOLD {
                exact_match = true;
            }
            tracing::trace!(
                "Offer {:?} best matches want {:?} ({:.3})",
                offer.name,
                best.skill.name,
                best.score
            );
            weighted.push(best.score * offer.level.weight());
        }

        if weighted.is_empty() {
            return 0.0;
        }

        let mean = weighted.iter().sum::<f64>() / weighted.len() as f64;
        let max = weighted.iter().copied().fold(0.0, f64::max);

        let aggregate = if exact_match {
            0.8 * max + 0.2 * mean
        } else {
            0.7 * mean + 0.3 * max
        };

        clamp_unit(aggregate)
    }
}

/// Trimmed, lowercased skill name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Text sent to the embedding provider for a skill
pub fn skill_text(skill: &Skill) -> String {
    let mut text = skill.name.trim().to_string();

    if let Some(category) = skill.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        text.push_str(&format!(" ({})", category));
    }
    if let Some(description) = skill.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        text.push_str(&format!(": {}", description));
    }
    text.push_str(&format!(" [{}]", skill.level.as_str()));

    text
}

/// `len(shorter) / len(longer)` when one name contains the other
fn containment_ratio(a: &str, b: &str) -> Option<f64> {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if longer.contains(shorter) {
        Some(shorter.chars().count() as f64 / longer.chars().count() as f64)
    } else {
        None
    }
}

/// Similarity of two normalized names without embeddings
pub fn lexical_similarity(a: &str, b: &str) -> f64 {
    if let Some(ratio) = containment_ratio(a, b) {
        return if ratio > NEAR_EXACT_RATIO {
            STRONG_CONTAINMENT_SCORE
        } else {
            WEAK_CONTAINMENT_SCORE
        };
    }

    let overlap = jaccard(&tokenize(a), &tokenize(b));
    if overlap > 0.5 {
        overlap * 0.8
    } else {
        overlap * 0.5
    }
}

fn tokenize(name: &str) -> HashSet<&str> {
    name.split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '/'))
        .filter(|t| !t.is_empty())
        .collect()
}

fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}
