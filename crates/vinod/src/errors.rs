use thiserror::Error;

use crate::models::transcript::TranscriptError;

/// Failures raised at the tool registry boundary. These never escape the agent:
/// they are folded into a `tool_result` part so the model can react to them.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Tool timed out after {0} seconds")]
    Timeout(u64),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Failures talking to the model gateway.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

/// Failures that end the current turn of a conversation.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Generation failed: {0}")]
    Gateway(#[from] ProviderError),

    #[error("Model kept requesting tools after {rounds} rounds")]
    ToolLoopExceeded { rounds: usize },

    #[error(transparent)]
    InvalidTranscript(#[from] TranscriptError),
}

impl AgentError {
    /// Text shown to the user in place of an answer. Never carries internal detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            AgentError::Gateway(_) => {
                "Sorry, I couldn't reach my language model just now. Please try again."
            }
            AgentError::ToolLoopExceeded { .. } => {
                "Sorry, I wasn't able to finish working that out. Please try rephrasing your question."
            }
            AgentError::InvalidTranscript(_) => {
                "Sorry, this conversation got out of sync. Please start a new one."
            }
        }
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
