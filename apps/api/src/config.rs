use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Base URL of the embedding-similarity service (see `similarity.rs`).
    pub similarity_api_url: String,
    pub similarity_api_key: Option<String>,
    /// Optional — when unset the analysis cache falls back to in-process memory.
    pub redis_url: Option<String>,
    /// Optional — DOCX text extraction is delegated to this converter service.
    pub docx_converter_url: Option<String>,
    /// Per-enhancement-stage deadline. A stage that exceeds it degrades to defaults.
    pub enhancer_timeout_secs: u64,
    /// Retention for analysis results and rendered reports in the cache.
    pub result_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            similarity_api_url: require_env("SIMILARITY_API_URL")?,
            similarity_api_key: std::env::var("SIMILARITY_API_KEY").ok(),
            redis_url: std::env::var("REDIS_URL").ok(),
            docx_converter_url: std::env::var("DOCX_CONVERTER_URL").ok(),
            enhancer_timeout_secs: parse_env_or("ENHANCER_TIMEOUT_SECS", 30)?,
            result_ttl_secs: parse_env_or("RESULT_TTL_SECS", 3600)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env_or(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{key} must be a positive integer")),
        Err(_) => Ok(default),
    }
}
