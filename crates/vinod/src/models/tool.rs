use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// The advertised shape of a tool, sent to the model so it can construct calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSpec {
    /// The name of the tool, unique within a registry
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// JSON schema object describing the parameters
    pub parameters: Value,
}

impl ToolSpec {
    pub fn new<N, D>(name: N, description: D, parameters: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        ToolSpec {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Names listed in the schema's `required` array.
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(Value::as_array)
            .map(|required| required.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

fn empty_arguments() -> Value {
    json!({})
}

/// A tool invocation requested by the model, kept exactly as the model phrased it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Set by models that correlate calls and responses explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The name of the tool to execute
    pub name: String,
    /// The arguments for the execution
    #[serde(rename = "args", default = "empty_arguments")]
    pub arguments: Value,
    /// Opaque reasoning signature attached to the part carrying this call.
    /// Lives beside `functionCall` on the wire, so the part handles it.
    #[serde(skip)]
    pub thought_signature: Option<String>,
}

impl ToolCall {
    pub fn new<S: Into<String>>(name: S, arguments: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
            thought_signature: None,
        }
    }

    pub fn with_id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_thought_signature<S: Into<String>>(mut self, signature: S) -> Self {
        self.thought_signature = Some(signature.into());
        self
    }
}

/// Outcome of running a tool, as recorded in the transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolPayload {
    Result(Value),
    Error(String),
}

impl ToolPayload {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolPayload::Error(_))
    }
}

/// The answer to a [`ToolCall`], fed back to the model on the next request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResponse {
    /// Echoes the id of the call being answered, when it had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "response")]
    pub payload: ToolPayload,
}

impl ToolResponse {
    pub fn success<S: Into<String>>(name: S, value: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            payload: ToolPayload::Result(value),
        }
    }

    pub fn error<S: Into<String>, E: ToString>(name: S, error: E) -> Self {
        Self {
            id: None,
            name: name.into(),
            payload: ToolPayload::Error(error.to_string()),
        }
    }

    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_parameters() {
        let spec = ToolSpec::new(
            "sum",
            "Adds",
            json!({"type": "object", "properties": {}, "required": ["a", "b"]}),
        );
        assert_eq!(spec.required_parameters(), vec!["a", "b"]);

        let open = ToolSpec::new("noop", "Nothing", json!({"type": "object"}));
        assert!(open.required_parameters().is_empty());
    }

    #[test]
    fn test_tool_call_wire_shape() {
        let call: ToolCall = serde_json::from_value(json!({"name": "sum"})).unwrap();
        assert_eq!(call.arguments, json!({}));

        let call = ToolCall::new("isPrime", json!({"n": 7}));
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"name": "isPrime", "args": {"n": 7}})
        );
    }

    #[test]
    fn test_tool_call_id_is_optional() {
        let call: ToolCall = serde_json::from_value(
            json!({"id": "call-1", "name": "sum", "args": {"a": 1, "b": 2}}),
        )
        .unwrap();
        assert_eq!(call.id.as_deref(), Some("call-1"));
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"id": "call-1", "name": "sum", "args": {"a": 1, "b": 2}})
        );

        let answer = ToolResponse::success("sum", json!(3)).with_id(call.id.clone());
        assert_eq!(
            serde_json::to_value(&answer).unwrap(),
            json!({"id": "call-1", "name": "sum", "response": {"result": 3}})
        );
    }

    #[test]
    fn test_tool_response_wire_shape() {
        let ok = ToolResponse::success("sum", json!(5));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"name": "sum", "response": {"result": 5}})
        );

        let failed = ToolResponse::error("getCryptoPrice", "upstream down");
        assert!(failed.payload.is_error());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"name": "getCryptoPrice", "response": {"error": "upstream down"}})
        );
    }
}
