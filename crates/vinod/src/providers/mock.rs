use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::ProviderError;
use crate::models::message::Turn;
use crate::models::tool::{ToolCall, ToolSpec};
use crate::providers::base::{ModelReply, Provider};

/// A mock provider that returns pre-configured replies for testing
pub struct MockProvider {
    replies: Mutex<Vec<Result<ModelReply, ProviderError>>>,
    /// Replayed once the script runs out, so a loop can be driven indefinitely
    fallback: Option<ModelReply>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<Turn>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of replies
    pub fn new(replies: Vec<ModelReply>) -> Self {
        Self::scripted(replies.into_iter().map(Ok).collect())
    }

    pub fn scripted(replies: Vec<Result<ModelReply, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            fallback: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// A provider that asks for the same tool call forever
    pub fn always_calling(call: ToolCall) -> Self {
        Self {
            fallback: Some(ModelReply::ToolCalls(vec![call])),
            ..Self::scripted(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The transcript as it was passed on each request
    pub fn seen(&self) -> Vec<Vec<Turn>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        turns: &[Turn],
        _tools: &[ToolSpec],
    ) -> Result<ModelReply, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(turns.to_vec());

        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Ok(self
                .fallback
                .clone()
                .unwrap_or_else(|| ModelReply::Text(String::new())))
        } else {
            replies.remove(0)
        }
    }
}
