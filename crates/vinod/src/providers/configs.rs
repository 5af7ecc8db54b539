use anyhow::{anyhow, Result};
use std::env;

pub const GEMINI_HOST: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Helper to read environment variables with a default for optional ones
pub fn get_env(key: &str, required: bool, default: Option<String>) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(Some(value)),
        Ok(_) | Err(env::VarError::NotPresent) if !required => Ok(default),
        Ok(_) | Err(env::VarError::NotPresent) => Err(anyhow!(
            "Environment variable '{}' is required but not set.",
            key
        )),
        Err(e) => Err(e.into()),
    }
}

/// First non-empty value among `keys`, in order
pub fn first_env(keys: &[&str]) -> Result<Option<String>> {
    for key in keys {
        if let Some(value) = get_env(key, false, None)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

#[derive(Debug, Clone)]
pub struct GeminiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl GeminiProviderConfig {
    pub fn new<K: Into<String>>(api_key: K) -> Self {
        Self {
            host: GEMINI_HOST.to_string(),
            api_key: api_key.into(),
            model: GEMINI_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Each setting is read from `VINOD_PROVIDER__*` first, then `GEMINI_*`.
    /// The API key is required; host, model, temperature and max tokens are optional.
    pub fn from_env() -> Result<Self> {
        let api_key = first_env(&["VINOD_PROVIDER__API_KEY", "GEMINI_API_KEY"])?
            .ok_or_else(|| anyhow!("VINOD_PROVIDER__API_KEY or GEMINI_API_KEY must be set"))?;

        let host = first_env(&["VINOD_PROVIDER__HOST", "GEMINI_HOST"])?
            .unwrap_or_else(|| GEMINI_HOST.to_string());
        let model = first_env(&["VINOD_PROVIDER__MODEL", "GEMINI_MODEL"])?
            .unwrap_or_else(|| GEMINI_MODEL.to_string());

        let temperature = first_env(&["VINOD_PROVIDER__TEMPERATURE", "GEMINI_TEMPERATURE"])?
            .map(|t| t.parse::<f32>())
            .transpose()
            .map_err(|e| anyhow!("temperature: {}", e))?;
        let max_tokens = first_env(&["VINOD_PROVIDER__MAX_TOKENS", "GEMINI_MAX_TOKENS"])?
            .map(|t| t.parse::<i32>())
            .transpose()
            .map_err(|e| anyhow!("max tokens: {}", e))?;

        Ok(Self {
            host,
            api_key,
            model,
            temperature,
            max_tokens,
        })
    }
}
