use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; a missing or placeholder API key means the
/// service runs in offline mode.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub candidate_data_dir: PathBuf,
    /// Sessions untouched for this long are dropped from memory.
    pub session_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .and_then(|key| usable_api_key(&key)),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            candidate_data_dir: std::env::var("CANDIDATE_DATA_DIR")
                .unwrap_or_else(|_| "candidate_data".to_string())
                .into(),
            session_idle_timeout: Duration::from_secs(
                std::env::var("SESSION_IDLE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse::<u64>()
                    .context("SESSION_IDLE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
        })
    }
}

/// Returns the key unless it is blank or an obvious template placeholder.
pub fn usable_api_key(raw: &str) -> Option<String> {
    let key = raw.trim();
    let lower = key.to_lowercase();
    let placeholder = key.is_empty()
        || key.starts_with("YOUR_")
        || lower.starts_with("your-api-key")
        || (key.starts_with('<') && key.ends_with('>'));
    (!placeholder).then(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_key_is_kept() {
        assert_eq!(
            usable_api_key("  sk-ant-api03-abc  ").as_deref(),
            Some("sk-ant-api03-abc")
        );
    }

    #[test]
    fn test_placeholders_are_rejected() {
        for raw in ["", "   ", "YOUR_API_KEY_HERE", "your-api-key", "<anthropic key>"] {
            assert_eq!(usable_api_key(raw), None, "{raw:?} should be a placeholder");
        }
    }
}
