use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use helpdesk::PipelineConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub embedding_model: String,
    pub openai_base_url: Option<String>,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = PipelineConfig::default();
        let pipeline = PipelineConfig::new()
            .with_top_k(parse_var("TOP_K")?.unwrap_or(defaults.top_k))
            .with_similarity_threshold(
                parse_var("SIMILARITY_THRESHOLD")?.unwrap_or(defaults.similarity_threshold),
            )
            .with_classification_timeout(
                parse_secs("CLASSIFICATION_TIMEOUT_SECS")?.unwrap_or(defaults.classification_timeout),
            )
            .with_generation_timeout(
                parse_secs("GENERATION_TIMEOUT_SECS")?.unwrap_or(defaults.generation_timeout),
            );
        pipeline.validate().context("Invalid pipeline settings")?;

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            data_dir: env::var("DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT")?.unwrap_or(8000),
            pipeline,
        })
    }
}

/// Parse an optional duration given in seconds.
fn parse_secs(name: &str) -> Result<Option<Duration>> {
    parse_var::<f64>(name)?
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .with_context(|| format!("{name} must be a non-negative number of seconds"))
        })
        .transpose()
}

/// Parse an optional variable, failing only when it is set but malformed.
fn parse_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a valid number, got {raw:?}")),
        Err(_) => Ok(None),
    }
}
