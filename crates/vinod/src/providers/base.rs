use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::message::Turn;
use crate::models::tool::{ToolCall, ToolSpec};

/// What the model produced for one request: either the answer, or a request to run tools first
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Text(String),
    /// Never empty, in the order the model asked for them
    ToolCalls(Vec<ToolCall>),
}

impl ModelReply {
    pub fn is_final(&self) -> bool {
        matches!(self, ModelReply::Text(_))
    }
}

/// Base trait for hosted model gateways
#[async_trait]
pub trait Provider: Send + Sync {
    /// Ask the model for its next move given the whole transcript and the tools on offer
    async fn complete(
        &self,
        system: &str,
        turns: &[Turn],
        tools: &[ToolSpec],
    ) -> Result<ModelReply, ProviderError>;
}
