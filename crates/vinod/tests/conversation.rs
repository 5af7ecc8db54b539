use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;
use vinod::agent::Agent;
use vinod::errors::AgentError;
use vinod::keyword::KeywordAgent;
use vinod::models::tool::{ToolPayload, ToolResponse};
use vinod::models::transcript::Transcript;
use vinod::providers::configs::GeminiProviderConfig;
use vinod::providers::gemini::GeminiProvider;
use vinod::tools::crypto::CoinGecko;
use vinod::tools::ToolRegistry;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE: &str = "/v1beta/models/gemini-test:generateContent";

async fn coingecko() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/coins/markets"))
        .and(query_param("ids", "bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "current_price": 67234.5,
            "price_change_percentage_24h": 2.5
        }])))
        .mount(&server)
        .await;
    server
}

fn registry(prices: &MockServer) -> ToolRegistry {
    let source = CoinGecko::new(prices.uri(), Duration::from_secs(2)).unwrap();
    ToolRegistry::with_builtins(Arc::new(source)).unwrap()
}

fn gemini(server: &MockServer) -> GeminiProvider {
    let mut config = GeminiProviderConfig::new("test_api_key");
    config.host = server.uri();
    config.model = "gemini-test".to_string();
    GeminiProvider::new(config).unwrap()
}

fn model_text(text: &str) -> serde_json::Value {
    json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}, "finishReason": "STOP"}]})
}

#[tokio::test]
async fn price_question_goes_through_tool_round() {
    let prices = coingecko().await;
    let model = MockServer::start().await;

    // Second request carries the tool result; match it before the generic one
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .and(body_string_contains("functionResponse"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(model_text("Bitcoin is trading at $67,234.50, up 2.5% today.")),
        )
        .expect(1)
        .mount(&model)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "getCryptoPrice", "args": {"coin": "btc"}}}
                ]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&model)
        .await;

    let agent = Agent::new(Box::new(gemini(&model)), registry(&prices));
    let mut transcript = Transcript::new();

    let text = assert_ok!(agent.reply(&mut transcript, "What's BTC at?").await);
    assert_eq!(text, "Bitcoin is trading at $67,234.50, up 2.5% today.");
    assert_eq!(transcript.len(), 4);
    assert_ok!(transcript.validate());

    let result = transcript.turns()[2].tool_results()[0].clone();
    assert_eq!(
        result,
        ToolResponse {
            id: None,
            name: "getCryptoPrice".to_string(),
            payload: ToolPayload::Result(json!({
                "name": "Bitcoin",
                "symbol": "BTC",
                "price": 67234.5,
                "change24h": 2.5
            })),
        }
    );

    // The browser sends the history back verbatim on the next message
    let wire = serde_json::to_string(&transcript).unwrap();
    let restored: Transcript = serde_json::from_str(&wire).unwrap();
    assert_eq!(restored, transcript);
}

#[tokio::test]
async fn gateway_outage_leaves_history_untouched() {
    let prices = coingecko().await;
    let model = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .respond_with(ResponseTemplate::new(503).set_body_json(
            json!({"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}),
        ))
        .mount(&model)
        .await;

    let agent = Agent::new(Box::new(gemini(&model)), registry(&prices));
    let mut transcript = Transcript::new();
    transcript.push_user_text("hi");
    transcript.push(vinod::models::message::Turn::model().with_text("Hello!"));
    let before = transcript.clone();

    let err = agent.reply(&mut transcript, "bitcoin?").await.unwrap_err();
    assert!(matches!(err, AgentError::Gateway(_)));
    assert_eq!(transcript, before);
}

#[tokio::test]
async fn keyword_mode_uses_live_prices() {
    let prices = coingecko().await;
    let agent = KeywordAgent::new(registry(&prices));
    let mut transcript = Transcript::new();

    assert_eq!(
        agent.reply(&mut transcript, "btc price").await,
        "💰 Bitcoin (BTC): $67,234.5 (+2.50% 24h)"
    );
    assert_eq!(
        agent.reply(&mut transcript, "What is 25 + 5?").await,
        "The sum of 25 and 5 is 30."
    );
    assert_eq!(transcript.len(), 4);
}
