use crate::error::ConfigError;
use crate::llm::{GenerationConfig, SafetySetting};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(120);

/// Process-wide settings, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub model: String,
    pub api_base: String,
    pub generation: GenerationConfig,
    pub safety_settings: Vec<SafetySetting>,
    pub fetch_timeout: Duration,
    pub model_timeout: Duration,
}

impl Config {
    pub fn new(gemini_api_key: impl Into<String>) -> Self {
        Self {
            gemini_api_key: gemini_api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            generation: GenerationConfig::default(),
            safety_settings: Vec::new(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    /// Read configuration from the environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Some(model) = lookup("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(base) = lookup("GEMINI_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(timeout) = timeout_secs(&lookup, "FETCH_TIMEOUT_SECS")? {
            config.fetch_timeout = timeout;
        }
        if let Some(timeout) = timeout_secs(&lookup, "GEMINI_TIMEOUT_SECS")? {
            config.model_timeout = timeout;
        }
        Ok(config)
    }
}

fn timeout_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value: value.clone() })?;
    Ok(Some(Duration::from_secs(secs)))
}
