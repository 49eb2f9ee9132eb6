// Runtime configuration, read from the environment (a .env file is honoured).

use crate::core::moderation::DEFAULT_CLASSIFIER_TIMEOUT;
use anyhow::{anyhow, Context};
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "data/bubble_feed.db";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub jwt_secret: String,
    pub banned_words_file: Option<String>,
    /// Enables the OpenRouter classifier when set
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub classifier_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        // Treat empty values like unset ones
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("BUBBLE_JWT_SECRET")
            .ok_or_else(|| anyhow!("Missing BUBBLE_JWT_SECRET environment variable!"))?;

        let classifier_timeout = match get("BUBBLE_CLASSIFIER_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse::<u64>()
                    .with_context(|| format!("Invalid BUBBLE_CLASSIFIER_TIMEOUT_MS: {}", raw))?,
            ),
            None => DEFAULT_CLASSIFIER_TIMEOUT,
        };

        Ok(Self {
            database_url: get("BUBBLE_DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: get("BUBBLE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            banned_words_file: get("BUBBLE_BANNED_WORDS_FILE"),
            openrouter_api_key: get("OPENROUTER_API_KEY"),
            openrouter_model: get("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            classifier_timeout,
        })
    }
}
