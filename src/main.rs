use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use swapmatch::config::{LoggingSettings, Settings};
use swapmatch::models::{ErrorResponse, MatchRequest, MatchResponse, SimilarityResponse, Skill, SkillLevel};
use swapmatch::{EmbeddingHandle, MatchingEngine};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use validator::Validate;

#[derive(Debug, Parser)]
#[command(name = "swapmatch", version, about = "Rank skill-exchange partners by compatibility")]
struct Cli {
    /// Configuration file (defaults to config/default + config/local)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank the candidates of a JSON match request
    Rank {
        /// Request file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        input: String,

        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,

        /// Keep only candidates where both skill directions clear the configured minimum
        #[arg(long)]
        mutual_only: bool,
    },
    /// Print the similarity of two skill names
    Similarity { left: String, right: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match loaded {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings.logging);
    info!("Configuration loaded successfully");

    let embeddings = match EmbeddingHandle::from_settings(&settings.embedding) {
        Ok(handle) => handle,
        Err(e) => {
            warn!("Failed to build embedding client ({}), running without embeddings", e);
            EmbeddingHandle::disabled()
        }
    };
    let engine = MatchingEngine::new(Arc::new(embeddings));

    let outcome = match cli.command {
        Command::Rank { input, pretty, mutual_only } => {
            rank(&engine, &settings, &input, pretty, mutual_only).await
        }
        Command::Similarity { left, right } => similarity(&engine, left, right).await,
    };

    match outcome {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(response) => {
            error!("{}: {}", response.error, response.message);
            eprintln!("{}", serde_json::to_string(&response).unwrap_or(response.message));
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging; `LOG_LEVEL` and `LOG_FORMAT` override the settings
fn init_logging(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

async fn rank(
    engine: &MatchingEngine,
    settings: &Settings,
    input: &str,
    pretty: bool,
    mutual_only: bool,
) -> Result<String, ErrorResponse> {
    let raw = read_input(input).map_err(|e| ErrorResponse {
        error: "Failed to read request".to_string(),
        message: e.to_string(),
    })?;

    let request: MatchRequest = serde_json::from_str(&raw).map_err(|e| ErrorResponse {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", e),
    })?;

    if let Err(errors) = request.validate() {
        return Err(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
        });
    }

    let config = request.config(&settings.match_config());

    info!(
        "Finding matches for {} among {} candidates",
        request.subject.id,
        request.candidates.len()
    );

    let batch = if mutual_only {
        engine
            .find_mutual_matches(
                &request.subject,
                &request.candidates,
                &config,
                settings.matching.bidirectional_min_score,
            )
            .await
    } else {
        engine
            .find_matches_with_stats(&request.subject, &request.candidates, &config)
            .await
    };

    let response = MatchResponse {
        matches: batch.results,
        total_candidates: batch.total_candidates,
        scored_candidates: batch.scored_candidates,
        generated_at: chrono::Utc::now(),
    };

    let encoded = if pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    encoded.map_err(|e| ErrorResponse {
        error: "Failed to encode response".to_string(),
        message: e.to_string(),
    })
}

async fn similarity(engine: &MatchingEngine, left: String, right: String) -> Result<String, ErrorResponse> {
    let score = engine
        .skills()
        .similarity(
            &Skill::new(left.as_str(), SkillLevel::Expert),
            &Skill::new(right.as_str(), SkillLevel::Expert),
        )
        .await;

    serde_json::to_string(&SimilarityResponse { left, right, score }).map_err(|e| ErrorResponse {
        error: "Failed to encode response".to_string(),
        message: e.to_string(),
    })
}

fn read_input(input: &str) -> std::io::Result<String> {
    if input == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        std::fs::read_to_string(input)
    }
}
