use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

use crate::llm::XaiClient;
use crate::posting::XClient;

const APP_DIR: &str = "news-thread";

#[derive(Debug, Clone)]
pub struct Config {
    pub xai_api_key: String,
    pub xai_model: String,
    pub xai_api_base: String,
    /// OAuth 2.0 user-context token. Posting is skipped without one.
    pub x_access_token: Option<String>,
    pub x_api_base: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let xai_api_key = env::var("XAI_API_KEY").context(
            "XAI_API_KEY not found.\n\n\
            To fix this, create ~/.config/news-thread/.env with:\n  \
            XAI_API_KEY=your_key_here\n  \
            X_ACCESS_TOKEN=your_token_here\n\n\
            Get your xAI API key from: https://console.x.ai",
        )?;

        Ok(Self {
            xai_api_key,
            xai_model: var_or("XAI_MODEL", XaiClient::DEFAULT_MODEL),
            xai_api_base: var_or("XAI_API_BASE", XaiClient::DEFAULT_BASE_URL),
            x_access_token: env::var("X_ACCESS_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            x_api_base: var_or("X_API_BASE", XClient::DEFAULT_BASE_URL),
        })
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/news-thread/.env
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join(APP_DIR).join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Knobs for one fetch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub max_stories: usize,
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            max_stories: 5,
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl FetchSettings {
    pub fn new(max_stories: usize, max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            max_stories: max_stories.max(1),
            max_retries: max_retries.max(1),
            backoff_base,
        }
    }
}
