use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;
use vinod::agent::{DEFAULT_MAX_ROUNDS, DEFAULT_MODEL_TIMEOUT, DEFAULT_TOOL_TIMEOUT};
use vinod::providers::configs::{GeminiProviderConfig, GEMINI_HOST, GEMINI_MODEL};
use vinod::tools::crypto::{COINGECKO_HOST, DEFAULT_PRICE_TIMEOUT};

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Which backend answers chat messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Hosted model with tool calling
    #[default]
    Agent,
    /// Offline keyword matcher
    Keyword,
}

impl AgentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentMode::Agent => "agent",
            AgentMode::Keyword => "keyword",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AgentSettings {
    #[serde(default)]
    pub mode: AgentMode,
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            mode: AgentMode::default(),
            max_tool_rounds: default_max_tool_rounds(),
            tool_timeout_secs: default_tool_timeout_secs(),
            model_timeout_secs: default_model_timeout_secs(),
        }
    }
}

impl AgentSettings {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_provider_host")]
    pub host: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            host: default_provider_host(),
            model: default_model(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ProviderSettings {
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    // Convert to the vinod GeminiProviderConfig
    pub fn into_config(self) -> Result<GeminiProviderConfig, ConfigError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;
        Ok(GeminiProviderConfig {
            host: self.host,
            api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PriceSettings {
    #[serde(default = "default_prices_host")]
    pub host: String,
    #[serde(default = "default_price_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PriceSettings {
    fn default() -> Self {
        Self {
            host: default_prices_host(),
            timeout_secs: default_price_timeout_secs(),
        }
    }
}

impl PriceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub prices: PriceSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Agent defaults
            .set_default("agent.mode", AgentMode::default().as_str())?
            .set_default("agent.max_tool_rounds", default_max_tool_rounds() as u64)?
            // Provider defaults
            .set_default("provider.host", default_provider_host())?
            .set_default("provider.model", default_model())?
            .set_default("prices.host", default_prices_host())?;

        // The bare GEMINI_API_KEY is honoured, but VINOD_PROVIDER__API_KEY wins
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                builder = builder.set_default("provider.api_key", key)?;
            }
        }

        let config = builder
            .add_source(File::with_name("vinod").required(false))
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("VINOD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            let message = err.to_string();
            match err {
                config::ConfigError::Type { key: Some(key), .. } => ConfigError::InvalidValue {
                    env_var: to_env_var(&key),
                    message,
                },
                config::ConfigError::NotFound(field) => ConfigError::MissingEnvVar {
                    env_var: to_env_var(&field),
                },
                other => ConfigError::Other(other),
            }
        })
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_tool_rounds() -> usize {
    DEFAULT_MAX_ROUNDS
}

fn default_tool_timeout_secs() -> u64 {
    DEFAULT_TOOL_TIMEOUT.as_secs()
}

fn default_model_timeout_secs() -> u64 {
    DEFAULT_MODEL_TIMEOUT.as_secs()
}

fn default_provider_host() -> String {
    GEMINI_HOST.to_string()
}

fn default_model() -> String {
    GEMINI_MODEL.to_string()
}

fn default_prices_host() -> String {
    COINGECKO_HOST.to_string()
}

fn default_price_timeout_secs() -> u64 {
    DEFAULT_PRICE_TIMEOUT.as_secs()
}
