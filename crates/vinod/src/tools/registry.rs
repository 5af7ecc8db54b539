use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use strum::IntoEnumIterator;

use super::crypto::PriceSource;
use super::{BuiltinTool, Tool};
use crate::errors::{ToolError, ToolResult};
use crate::models::tool::ToolSpec;

/// The authoritative set of tools an agent may call, keyed by name
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding `sum`, `isPrime` and `getCryptoPrice`
    pub fn with_builtins(prices: Arc<dyn PriceSource>) -> ToolResult<Self> {
        let mut registry = Self::new();
        for builtin in BuiltinTool::iter() {
            registry.register(builtin.instantiate(prices.clone()))?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) -> ToolResult<()> {
        let name = tool.spec().name.clone();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Schemas in registration order
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec().clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn invoke(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        let tool = self
            .index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::ToolNotFound(name.to_string()))?;

        tool.validate(&arguments)?;
        tool.call(arguments).await
    }
}
