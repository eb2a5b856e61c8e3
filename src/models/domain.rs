use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Self-assessed proficiency for a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    /// How much an offered skill at this level is trusted when aggregating
    #[inline]
    pub fn weight(self) -> f64 {
        match self {
            SkillLevel::Beginner => 0.5,
            SkillLevel::Intermediate => 0.75,
            SkillLevel::Advanced => 0.9,
            SkillLevel::Expert => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
            SkillLevel::Expert => "expert",
        }
    }
}

/// A skill a profile offers or wants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub level: SkillLevel,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Skill {
    pub fn new(name: impl Into<String>, level: SkillLevel) -> Self {
        Self {
            name: name.into(),
            level,
            description: None,
            category: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Declared whereabouts of a profile; any subset may be absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Location {
    pub fn city(city: &str, country: &str) -> Self {
        Self {
            city: Some(city.to_string()),
            country: Some(country.to_string()),
            ..Self::default()
        }
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::default()
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Both coordinates, if present
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// True when the location carries nothing the geo scorer can use
    pub fn is_empty(&self) -> bool {
        blank(&self.city) && blank(&self.country) && self.lat_lon().is_none()
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// A participant in the exchange, already normalized by the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub offers: Vec<Skill>,
    #[serde(default)]
    pub wants: Vec<Skill>,
    /// Externally maintained reliability in [0, 1]
    #[serde(default)]
    pub trust: Option<f64>,
}

pub fn default_languages() -> Vec<String> {
    vec!["English".to_string()]
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            languages: default_languages(),
            location: None,
            offers: vec![],
            wants: vec![],
            trust: None,
        }
    }

    pub fn offering(mut self, skill: Skill) -> Self {
        self.offers.push(skill);
        self
    }

    pub fn wanting(mut self, skill: Skill) -> Self {
        self.wants.push(skill);
        self
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn speaking(mut self, languages: &[&str]) -> Self {
        self.languages = languages.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn trusted(mut self, trust: f64) -> Self {
        self.trust = Some(trust);
        self
    }

    /// Reject profiles the engine cannot score meaningfully
    pub fn check(&self) -> Result<(), MatchError> {
        let invalid = |reason: &str| MatchError::InvalidProfile {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }

        if let Some(trust) = self.trust {
            if !trust.is_finite() || !(0.0..=1.0).contains(&trust) {
                return Err(invalid("trust outside [0, 1]"));
            }
        }

        if let Some(location) = &self.location {
            if let Some(lat) = location.latitude {
                if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                    return Err(invalid("latitude out of range"));
                }
            }
            if let Some(lon) = location.longitude {
                if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                    return Err(invalid("longitude out of range"));
                }
            }
        }

        Ok(())
    }
}

/// Weights for (offer→want, want→offer, geo, language, trust)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    #[serde(rename = "offerToWant")]
    pub offer_to_want: f64,
    #[serde(rename = "wantToOffer")]
    pub want_to_offer: f64,
    pub geo: f64,
    pub language: f64,
    pub trust: f64,
}

impl WeightVector {
    /// Negative or non-finite weights count as zero. The weights are not rescaled;
    /// the combined total is clamped instead.
    pub fn sanitized(&self) -> Self {
        fn fix(w: f64) -> f64 {
            if w.is_finite() { w.max(0.0) } else { 0.0 }
        }
        Self {
            offer_to_want: fix(self.offer_to_want),
            want_to_offer: fix(self.want_to_offer),
            geo: fix(self.geo),
            language: fix(self.language),
            trust: fix(self.trust),
        }
    }

    pub fn sum(&self) -> f64 {
        self.offer_to_want + self.want_to_offer + self.geo + self.language + self.trust
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        Self {
            offer_to_want: 0.30,
            want_to_offer: 0.30,
            geo: 0.15,
            language: 0.15,
            trust: 0.10,
        }
    }
}

/// Minimum total forced by the boost policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostFloor {
    BothNearExact,
    BothStrong,
    OneNearExact,
    OneStrong,
    AnyOverlap,
}

/// Per-signal breakdown of a compatibility score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    #[serde(rename = "offerToWant")]
    pub offer_to_want: f64,
    #[serde(rename = "wantToOffer")]
    pub want_to_offer: f64,
    pub geo: f64,
    pub language: f64,
    pub trust: f64,
    pub total: f64,
    pub weights: WeightVector,
    /// Boost floor that raised the weighted sum, if any
    #[serde(default)]
    pub boost: Option<BoostFloor>,
}

/// A scored candidate for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub score: MatchScore,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Request-time ranking configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default)]
    pub weights: WeightVector,
    #[serde(rename = "minMatchScore", default)]
    pub min_match_score: f64,
    #[serde(rename = "maxResults", default = "default_max_results")]
    pub max_results: usize,
    /// Number of candidates scored concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

pub fn default_max_results() -> usize { 50 }
pub fn default_concurrency() -> usize { 8 }

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            weights: WeightVector::default(),
            min_match_score: 0.0,
            max_results: default_max_results(),
            concurrency: default_concurrency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((WeightVector::default().sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sanitized_weights() {
        let weights = WeightVector {
            offer_to_want: -1.0,
            want_to_offer: f64::NAN,
            geo: 2.0,
            language: 0.0,
            trust: f64::INFINITY,
        };
        let clean = weights.sanitized();
        assert_eq!(clean.offer_to_want, 0.0);
        assert_eq!(clean.want_to_offer, 0.0);
        assert_eq!(clean.geo, 2.0);
        assert_eq!(clean.trust, 0.0);
    }

    #[test]
    fn test_profile_deserialize_defaults() {
        let profile: Profile = serde_json::from_str(r#"{"id": "u1"}"#).unwrap();
        assert_eq!(profile.languages, vec!["English"]);
        assert!(profile.offers.is_empty());
        assert!(profile.location.is_none());
        assert!(profile.trust.is_none());
    }

    #[test]
    fn test_skill_level_parse() {
        let skill: Skill = serde_json::from_str(r#"{"name": "Rust", "level": "expert"}"#).unwrap();
        assert_eq!(skill.level, SkillLevel::Expert);
        assert_eq!(skill.level.weight(), 1.0);
    }

    #[test]
    fn test_profile_check() {
        assert!(Profile::new("u1").check().is_ok());
        assert!(Profile::new(" ").check().is_err());
        assert!(Profile::new("u1").trusted(1.2).check().is_err());
        assert!(Profile::new("u1").trusted(f64::NAN).check().is_err());
        assert!(Profile::new("u1").at(Location::coordinates(91.0, 0.0)).check().is_err());
        assert!(Profile::new("u1").at(Location::coordinates(45.0, f64::INFINITY)).check().is_err());
        assert!(Profile::new("u1").at(Location::coordinates(45.0, 7.0)).check().is_ok());
    }

    #[test]
    fn test_location_empty() {
        assert!(Location::default().is_empty());
        assert!(Location { city: Some("  ".into()), ..Location::default() }.is_empty());
        assert!(!Location::coordinates(1.0, 2.0).is_empty());
    }
}
