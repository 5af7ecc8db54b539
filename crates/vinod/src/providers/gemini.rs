use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::base::{ModelReply, Provider};
use super::configs::GeminiProviderConfig;
use crate::errors::ProviderError;
use crate::models::message::Turn;
use crate::models::tool::{ToolCall, ToolSpec};

pub const DEFAULT_GEMINI_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Gemini `generateContent` with native function calling
pub struct GeminiProvider {
    client: Client,
    config: GeminiProviderConfig,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(config: GeminiProviderConfig) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_GEMINI_TIMEOUT)
    }

    pub fn with_timeout(config: GeminiProviderConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            config,
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.host.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout.as_secs())
        } else {
            ProviderError::Request(err.to_string())
        }
    }

    fn normalize_response(response: GeminiResponse) -> Result<ModelReply, ProviderError> {
        let candidate = response.candidates.into_iter().next().ok_or_else(|| {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            ProviderError::InvalidResponse(format!("empty response: {reason}"))
        })?;

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

        let mut calls = Vec::new();
        let mut texts = Vec::new();
        for part in parts {
            if let Some(call) = part.function_call {
                calls.push(ToolCall {
                    thought_signature: part.thought_signature,
                    ..call
                });
            } else if let Some(text) = part.text {
                if !part.thought && !text.is_empty() {
                    texts.push(text);
                }
            }
        }

        if !calls.is_empty() {
            return Ok(ModelReply::ToolCalls(calls));
        }
        if texts.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "unknown".to_string());
            return Err(ProviderError::InvalidResponse(format!(
                "no text or function call in response (finish reason: {reason})"
            )));
        }
        Ok(ModelReply::Text(texts.join("")))
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn complete(
        &self,
        system: &str,
        turns: &[Turn],
        tools: &[ToolSpec],
    ) -> Result<ModelReply, ProviderError> {
        let request = GeminiRequest {
            contents: turns,
            system_instruction: (!system.is_empty()).then(|| SystemInstruction {
                parts: vec![TextPart { text: system }],
            }),
            tools: (!tools.is_empty()).then(|| {
                vec![GeminiTool {
                    function_declarations: tools,
                }]
            }),
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        tracing::debug!(
            model = %self.config.model,
            turns = turns.len(),
            tools = tools.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.request_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Self::normalize_response(response)
    }
}

// Gemini API types. Outgoing contents reuse the transcript's own serialization.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: &'a [Turn],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool<'a>>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool<'a> {
    function_declarations: &'a [ToolSpec],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    function_call: Option<ToolCall>,
    #[serde(default)]
    thought: bool,
    thought_signature: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
