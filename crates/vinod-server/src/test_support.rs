use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use vinod::agent::Agent;
use vinod::errors::{ProviderError, ToolError, ToolResult};
use vinod::keyword::KeywordAgent;
use vinod::models::message::Turn;
use vinod::models::tool::ToolSpec;
use vinod::providers::base::{ModelReply, Provider};
use vinod::tools::crypto::{CryptoQuote, PriceSource};
use vinod::tools::ToolRegistry;

use crate::routes;
use crate::state::{AppState, Backend};

/// Replays canned gateway results and records what it was asked
pub struct ScriptedProvider {
    replies: Mutex<Vec<Result<ModelReply, ProviderError>>>,
    panics: bool,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<Turn>>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<ModelReply, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            panics: false,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Vec<Turn>> {
        self.seen.lock().unwrap().clone()
    }
}

struct SharedProvider(Arc<ScriptedProvider>);

#[async_trait]
impl Provider for SharedProvider {
    async fn complete(
        &self,
        _system: &str,
        turns: &[Turn],
        _tools: &[ToolSpec],
    ) -> Result<ModelReply, ProviderError> {
        let provider = &self.0;
        provider.calls.fetch_add(1, Ordering::SeqCst);
        provider.seen.lock().unwrap().push(turns.to_vec());
        if provider.panics {
            panic!("provider exploded");
        }

        let mut replies = provider.replies.lock().unwrap();
        if replies.is_empty() {
            Err(ProviderError::InvalidResponse("script exhausted".to_string()))
        } else {
            replies.remove(0)
        }
    }
}

pub struct FixedPrices;

#[async_trait]
impl PriceSource for FixedPrices {
    async fn quote(&self, coin_id: &str) -> ToolResult<CryptoQuote> {
        match coin_id {
            "bitcoin" => Ok(CryptoQuote {
                name: "Bitcoin".to_string(),
                symbol: "BTC".to_string(),
                price: 67234.5,
                change_24h: Some(1.5),
            }),
            other => Err(ToolError::ExecutionError(format!("no market data for '{other}'"))),
        }
    }
}

fn registry() -> ToolRegistry {
    ToolRegistry::with_builtins(Arc::new(FixedPrices)).unwrap()
}

/// Full router over a model-driven backend
pub fn app(provider: Arc<ScriptedProvider>) -> Router {
    let agent = Agent::new(Box::new(SharedProvider(provider)), registry());
    routes::configure(AppState::new(Backend::Agent(Arc::new(agent))))
}

/// Full router over the keyword backend
pub fn keyword_app() -> Router {
    let agent = KeywordAgent::new(registry());
    routes::configure(AppState::new(Backend::Keyword(Arc::new(agent))))
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
