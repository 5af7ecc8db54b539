use std::sync::Arc;
use vinod::agent::Agent;
use vinod::errors::AgentResult;
use vinod::keyword::KeywordAgent;
use vinod::models::transcript::Transcript;
use vinod::providers::gemini::GeminiProvider;
use vinod::tools::crypto::CoinGecko;
use vinod::tools::ToolRegistry;

use crate::configuration::{AgentMode, Settings};

/// The component that turns a message into an answer
#[derive(Clone)]
pub enum Backend {
    Agent(Arc<Agent>),
    Keyword(Arc<KeywordAgent>),
}

impl Backend {
    pub fn mode(&self) -> AgentMode {
        match self {
            Backend::Agent(_) => AgentMode::Agent,
            Backend::Keyword(_) => AgentMode::Keyword,
        }
    }

    /// Extend `transcript` with the answer to `message`. Keyword mode never fails.
    pub async fn respond(&self, transcript: &mut Transcript, message: &str) -> AgentResult<String> {
        match self {
            Backend::Agent(agent) => agent.reply(transcript, message).await,
            Backend::Keyword(agent) => Ok(agent.reply(transcript, message).await),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Backend,
}

impl AppState {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Wire up the tool registry and the configured backend
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let prices = CoinGecko::new(settings.prices.host.clone(), settings.prices.timeout())?;
        let registry = ToolRegistry::with_builtins(Arc::new(prices))?;

        let backend = match settings.agent.mode {
            AgentMode::Agent => {
                let provider = GeminiProvider::with_timeout(
                    settings.provider.into_config()?,
                    settings.agent.model_timeout(),
                )?;
                let agent = Agent::new(Box::new(provider), registry)
                    .with_max_rounds(settings.agent.max_tool_rounds)
                    .with_tool_timeout(settings.agent.tool_timeout())
                    .with_model_timeout(settings.agent.model_timeout());
                Backend::Agent(Arc::new(agent))
            }
            AgentMode::Keyword => Backend::Keyword(Arc::new(KeywordAgent::new(registry))),
        };
        Ok(Self::new(backend))
    }
}
