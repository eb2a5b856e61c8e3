use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::domain::{default_concurrency, default_max_results};
use crate::models::{MatchConfig, WeightVector};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub embedding: EmbeddingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default)]
    pub min_match_score: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_bidirectional_min_score")]
    pub bidirectional_min_score: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            min_match_score: 0.0,
            max_results: default_max_results(),
            concurrency: default_concurrency(),
            bidirectional_min_score: default_bidirectional_min_score(),
        }
    }
}

fn default_bidirectional_min_score() -> f64 { 0.3 }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_offer_to_want_weight")]
    pub offer_to_want: f64,
    #[serde(default = "default_want_to_offer_weight")]
    pub want_to_offer: f64,
    #[serde(default = "default_geo_weight")]
    pub geo: f64,
    #[serde(default = "default_language_weight")]
    pub language: f64,
    #[serde(default = "default_trust_weight")]
    pub trust: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            offer_to_want: default_offer_to_want_weight(),
            want_to_offer: default_want_to_offer_weight(),
            geo: default_geo_weight(),
            language: default_language_weight(),
            trust: default_trust_weight(),
        }
    }
}

fn default_offer_to_want_weight() -> f64 { 0.30 }
fn default_want_to_offer_weight() -> f64 { 0.30 }
fn default_geo_weight() -> f64 { 0.15 }
fn default_language_weight() -> f64 { 0.15 }
fn default_trust_weight() -> f64 { 0.10 }

impl From<&WeightsConfig> for WeightVector {
    fn from(w: &WeightsConfig) -> Self {
        WeightVector {
            offer_to_want: w.offer_to_want,
            want_to_offer: w.want_to_offer,
            geo: w.geo,
            language: w.language,
            trust: w.trust,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_init_timeout_ms")]
    pub init_timeout_ms: u64,
    #[serde(default = "default_cache_size")]
    pub cache_size: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_embedding_endpoint(),
            api_key: None,
            model: default_embedding_model(),
            timeout_ms: default_timeout_ms(),
            init_timeout_ms: default_init_timeout_ms(),
            cache_size: default_cache_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_embedding_endpoint() -> String { "http://localhost:11434/v1".to_string() }
fn default_embedding_model() -> String { "all-minilm".to_string() }
fn default_timeout_ms() -> u64 { 2000 }
fn default_init_timeout_ms() -> u64 { 5000 }
fn default_cache_size() -> u64 { 10_000 }
fn default_cache_ttl_secs() -> u64 { 3600 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SWAPMATCH_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SWAPMATCH__MATCHING__MAX_RESULTS -> matching.max_results
            .add_source(env_source())
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize()
    }

    /// Engine defaults for requests that don't override them
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            weights: WeightVector::from(&self.scoring.weights),
            min_match_score: self.matching.min_match_score,
            max_results: self.matching.max_results,
            concurrency: self.matching.concurrency.max(1),
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("SWAPMATCH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// The embedding API key may come from the conventional `EMBEDDING_API_KEY` variable
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("EMBEDDING_API_KEY") {
        Ok(key) if !key.is_empty() => Config::builder()
            .add_source(settings)
            .set_override("embedding.api_key", key)?
            .build(),
        _ => Ok(settings),
    }
}
