use indoc::indoc;
use std::time::Duration;
use tokio::time::timeout;

use crate::errors::{AgentError, AgentResult, ProviderError, ToolError};
use crate::models::message::Turn;
use crate::models::tool::{ToolCall, ToolResponse, ToolSpec};
use crate::models::transcript::Transcript;
use crate::providers::base::{ModelReply, Provider};
use crate::tools::ToolRegistry;

pub const DEFAULT_MAX_ROUNDS: usize = 8;
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = indoc! {"
    You are AgentVinod, a helpful assistant.

    You have access to these tools:
    - sum: add two numbers together
    - isPrime: check whether a whole number is prime
    - getCryptoPrice: look up the current USD price of a cryptocurrency

    Use a tool whenever the question needs an exact calculation or live price data.
    If a tool reports an error, explain the problem to the user instead of guessing.
    For anything else, answer the question directly and concisely.
"};

/// Where the driver is within a single user turn
#[derive(Debug)]
enum DriverState {
    /// Waiting on the model; `rounds` tool rounds have completed so far
    ModelPending { rounds: usize },
    ToolDispatch { rounds: usize, calls: Vec<ToolCall> },
    FinalAnswer(String),
}

/// Agent integrates a hosted model with the tools it is allowed to call
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: ToolRegistry,
    system_prompt: String,
    max_rounds: usize,
    tool_timeout: Duration,
    model_timeout: Duration,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, registry: ToolRegistry) -> Self {
        Self {
            provider,
            registry,
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
            model_timeout: DEFAULT_MODEL_TIMEOUT,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_tool_timeout(mut self, tool_timeout: Duration) -> Self {
        self.tool_timeout = tool_timeout;
        self
    }

    pub fn with_model_timeout(mut self, model_timeout: Duration) -> Self {
        self.model_timeout = model_timeout;
        self
    }

    pub fn with_system_prompt<S: Into<String>>(mut self, system_prompt: S) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Answer one user message, extending `transcript` with every turn it took.
    ///
    /// On error the transcript is left exactly as it was passed in.
    pub async fn reply(&self, transcript: &mut Transcript, message: &str) -> AgentResult<String> {
        transcript.validate()?;

        let checkpoint = transcript.len();
        let outcome = self.drive(transcript, message).await;
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "reply failed, discarding partial turns");
            transcript.truncate_to(checkpoint);
        }
        outcome
    }

    async fn drive(&self, transcript: &mut Transcript, message: &str) -> AgentResult<String> {
        let tools = self.registry.specs();
        transcript.push_user_text(message);

        let mut state = DriverState::ModelPending { rounds: 0 };
        loop {
            state = match state {
                DriverState::ModelPending { rounds } => {
                    match self.generate(transcript, &tools).await? {
                        ModelReply::Text(text) => DriverState::FinalAnswer(text),
                        ModelReply::ToolCalls(_) if rounds >= self.max_rounds => {
                            return Err(AgentError::ToolLoopExceeded { rounds });
                        }
                        ModelReply::ToolCalls(calls) => DriverState::ToolDispatch { rounds, calls },
                    }
                }
                DriverState::ToolDispatch { rounds, calls } => {
                    tracing::debug!(round = rounds + 1, calls = calls.len(), "dispatching tools");

                    let mut results = Turn::user();
                    for call in &calls {
                        results = results.with_tool_result(self.dispatch(call).await);
                    }

                    let requests = calls
                        .into_iter()
                        .fold(Turn::model(), |turn, call| turn.with_tool_call(call));
                    transcript.push(requests);
                    transcript.push(results);

                    DriverState::ModelPending { rounds: rounds + 1 }
                }
                DriverState::FinalAnswer(text) => {
                    transcript.push(Turn::model().with_text(text.clone()));
                    return Ok(text);
                }
            };
        }
    }

    async fn generate(
        &self,
        transcript: &Transcript,
        tools: &[ToolSpec],
    ) -> Result<ModelReply, ProviderError> {
        let request = self
            .provider
            .complete(&self.system_prompt, transcript.turns(), tools);
        match timeout(self.model_timeout, request).await {
            Ok(reply) => reply,
            Err(_) => Err(ProviderError::Timeout(self.model_timeout.as_secs())),
        }
    }

    /// Run a single call. Every failure becomes an error result the model can read.
    async fn dispatch(&self, call: &ToolCall) -> ToolResponse {
        let invocation = self.registry.invoke(&call.name, call.arguments.clone());
        let outcome = match timeout(self.tool_timeout, invocation).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ToolError::Timeout(self.tool_timeout.as_secs())),
        };

        let response = match outcome {
            Ok(value) => ToolResponse::success(&call.name, value),
            Err(err) => {
                tracing::info!(tool = %call.name, error = %err, "tool call failed");
                ToolResponse::error(&call.name, err)
            }
        };
        response.with_id(call.id.clone())
    }
}
