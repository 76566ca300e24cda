use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub pdf_render_url: Option<String>,
    pub backend_timeout: Duration,
    pub notice_ttl: Duration,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            supabase_url: env::var("SUPABASE_URL").context("SUPABASE_URL must be set")?,
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .context("SUPABASE_SERVICE_ROLE_KEY must be set")?,
            port: parse_or("PORT", 8080)?,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|value| parse_list(&value))
                .unwrap_or_default(),
            pdf_render_url: env::var("PDF_RENDER_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            backend_timeout: Duration::from_secs(parse_or("BACKEND_TIMEOUT_SECS", 30)?),
            notice_ttl: Duration::from_secs(parse_or("NOTICE_TTL_SECS", 5)?),
            rate_limit_per_second: parse_or("RATE_LIMIT_PER_SECOND", 10)?,
            rate_limit_burst: parse_or("RATE_LIMIT_BURST", 20)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .ok()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}

/// Comma-separated list, blanks dropped.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
