use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::matching::workflow::DEFAULT_SELECTION_LIMIT;

/// Application configuration loaded from environment variables.
/// Every backing service is optional; unset URLs fall back to in-process adapters.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub directory_seed_path: Option<String>,
    pub scorer_url: Option<String>,
    pub scorer_timeout: Duration,
    pub selection_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let scorer_timeout_secs = optional("SCORER_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<u64>()
            .context("SCORER_TIMEOUT_SECS must be a whole number of seconds")?;

        let selection_limit = match optional("SELECTION_LIMIT") {
            Some(raw) => raw
                .parse::<usize>()
                .context("SELECTION_LIMIT must be a positive integer")?,
            None => DEFAULT_SELECTION_LIMIT,
        };
        ensure!(selection_limit >= 1, "SELECTION_LIMIT must be at least 1");

        Ok(Config {
            port: optional("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            database_url: optional("DATABASE_URL"),
            redis_url: optional("REDIS_URL"),
            directory_seed_path: optional("DIRECTORY_SEED_PATH"),
            scorer_url: optional("SCORER_URL"),
            scorer_timeout: Duration::from_secs(scorer_timeout_secs),
            selection_limit,
        })
    }
}
