use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::role::Role;
use super::tool::{ToolCall, ToolResponse};

/// Content carried inside a turn: plain text, a tool request, or a tool's answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WirePart", into = "WirePart")]
pub enum Part {
    Text(String),
    ToolCall(ToolCall),
    ToolResult(ToolResponse),
}

/// A part as it travels: exactly one content field plus part-level metadata
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<ToolResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

impl TryFrom<WirePart> for Part {
    type Error = String;

    fn try_from(wire: WirePart) -> Result<Self, Self::Error> {
        match (wire.text, wire.function_call, wire.function_response) {
            (Some(text), None, None) => Ok(Part::Text(text)),
            (None, Some(call), None) => Ok(Part::ToolCall(ToolCall {
                thought_signature: wire.thought_signature,
                ..call
            })),
            (None, None, Some(response)) => Ok(Part::ToolResult(response)),
            (None, None, None) => {
                Err("part needs one of text, functionCall or functionResponse".to_string())
            }
            _ => Err("part mixes text, functionCall and functionResponse".to_string()),
        }
    }
}

impl From<Part> for WirePart {
    fn from(part: Part) -> Self {
        let mut wire = WirePart {
            text: None,
            function_call: None,
            function_response: None,
            thought_signature: None,
        };
        match part {
            Part::Text(text) => wire.text = Some(text),
            Part::ToolCall(mut call) => {
                wire.thought_signature = call.thought_signature.take();
                wire.function_call = Some(call);
            }
            Part::ToolResult(response) => wire.function_response = Some(response),
        }
        wire
    }
}

impl Part {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Part::Text(text.into())
    }

    pub fn tool_call<S: Into<String>>(name: S, arguments: Value) -> Self {
        Part::ToolCall(ToolCall::new(name, arguments))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_tool_call(&self) -> Option<&ToolCall> {
        match self {
            Part::ToolCall(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_tool_result(&self) -> Option<&ToolResponse> {
        match self {
            Part::ToolResult(response) => Some(response),
            _ => None,
        }
    }
}

/// One role-tagged entry of a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn new(role: Role) -> Self {
        Turn {
            role,
            parts: Vec::new(),
        }
    }

    /// Create an empty user turn
    pub fn user() -> Self {
        Turn::new(Role::User)
    }

    /// Create an empty model turn
    pub fn model() -> Self {
        Turn::new(Role::Model)
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_part(Part::text(text))
    }

    pub fn with_tool_call(self, call: ToolCall) -> Self {
        self.with_part(Part::ToolCall(call))
    }

    pub fn with_tool_result(self, response: ToolResponse) -> Self {
        self.with_part(Part::ToolResult(response))
    }

    /// All text parts joined with newlines, or `None` when the turn has no text
    pub fn text(&self) -> Option<String> {
        let texts: Vec<&str> = self.parts.iter().filter_map(Part::as_text).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    }

    pub fn tool_calls(&self) -> Vec<&ToolCall> {
        self.parts.iter().filter_map(Part::as_tool_call).collect()
    }

    pub fn tool_results(&self) -> Vec<&ToolResponse> {
        self.parts.iter().filter_map(Part::as_tool_result).collect()
    }
}
