pub mod crypto;
pub mod math;
pub mod registry;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use strum_macros::{EnumIter, IntoStaticStr};

use crate::errors::{ToolError, ToolResult};
use crate::models::tool::ToolSpec;
use crypto::{GetCryptoPriceTool, PriceSource};
use math::{IsPrimeTool, SumTool};

pub use registry::ToolRegistry;

/// Capability that the agent can hand to the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// The schema advertised to the model
    fn spec(&self) -> &ToolSpec;

    /// Check arguments before the call. The default only enforces the schema's
    /// `required` set; anything stricter belongs in `call`.
    fn validate(&self, arguments: &Value) -> ToolResult<()> {
        let spec = self.spec();
        let object = arguments.as_object().ok_or_else(|| {
            ToolError::InvalidParameters(format!("{} expects an object of arguments", spec.name))
        })?;

        let missing: Vec<&str> = spec
            .required_parameters()
            .into_iter()
            .filter(|name| object.get(*name).map_or(true, Value::is_null))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ToolError::InvalidParameters(format!(
                "{} is missing required parameters: {}",
                spec.name,
                missing.join(", ")
            )))
        }
    }

    /// Run the tool
    async fn call(&self, arguments: Value) -> ToolResult<Value>;
}

/// The tools every agent ships with
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum BuiltinTool {
    #[strum(serialize = "sum")]
    Sum,
    #[strum(serialize = "isPrime")]
    IsPrime,
    #[strum(serialize = "getCryptoPrice")]
    GetCryptoPrice,
}

impl BuiltinTool {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn instantiate(self, prices: Arc<dyn PriceSource>) -> Box<dyn Tool> {
        match self {
            BuiltinTool::Sum => Box::new(SumTool::new()),
            BuiltinTool::IsPrime => Box::new(IsPrimeTool::new()),
            BuiltinTool::GetCryptoPrice => Box::new(GetCryptoPriceTool::new(prices)),
        }
    }
}

/// Pull a required argument out of a call, reporting the tool name on failure
pub(crate) fn argument<'a>(tool: &str, arguments: &'a Value, name: &str) -> ToolResult<&'a Value> {
    arguments
        .get(name)
        .filter(|value| !value.is_null())
        .ok_or_else(|| ToolError::InvalidParameters(format!("{tool} requires `{name}`")))
}
