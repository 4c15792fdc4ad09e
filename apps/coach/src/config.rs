use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client configuration loaded from environment variables (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub timeout: Duration,
    /// Where exported reports are saved.
    pub report_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout_secs = match lookup("COACH_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("COACH_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Config {
            api_base: lookup("COACH_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            report_dir: lookup("COACH_REPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "warn".to_string()),
        })
    }
}
