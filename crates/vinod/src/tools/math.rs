use async_trait::async_trait;
use serde_json::{json, Number, Value};

use super::{argument, BuiltinTool, Tool};
use crate::errors::{ToolError, ToolResult};
use crate::models::tool::ToolSpec;

/// Add two JSON numbers, staying in integers whenever both sides are integers
pub fn sum(a: &Number, b: &Number) -> ToolResult<Number> {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        if let Some(total) = a.checked_add(b) {
            return Ok(Number::from(total));
        }
    }
    let (a, b) = (to_f64(a)?, to_f64(b)?);
    Number::from_f64(a + b)
        .ok_or_else(|| ToolError::ExecutionError(format!("{a} + {b} is not a finite number")))
}

fn to_f64(n: &Number) -> ToolResult<f64> {
    n.as_f64()
        .ok_or_else(|| ToolError::InvalidParameters(format!("{n} is not representable")))
}

/// Trial division up to √n over the 6k ± 1 wheel
pub fn is_prime(n: i64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let n = n as u64;
    let mut i: u64 = 5;
    while i * i <= n {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Read an integer argument. Models often send `7.0` for `7`, so integral floats pass.
fn integer(tool: &str, value: &Value) -> ToolResult<i64> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => Ok(f as i64),
        _ => Err(ToolError::InvalidParameters(format!(
            "{tool} expects an integer, got {value}"
        ))),
    }
}

fn number<'a>(tool: &str, value: &'a Value) -> ToolResult<&'a Number> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(ToolError::InvalidParameters(format!(
            "{tool} expects a number, got {other}"
        ))),
    }
}

pub struct SumTool {
    spec: ToolSpec,
}

impl SumTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                BuiltinTool::Sum.name(),
                "Get the sum of two numbers.",
                json!({
                    "type": "object",
                    "properties": {
                        "a": {
                            "type": "number",
                            "description": "The first number to add, e.g. 10"
                        },
                        "b": {
                            "type": "number",
                            "description": "The second number to add, e.g. 20"
                        }
                    },
                    "required": ["a", "b"]
                }),
            ),
        }
    }
}

impl Default for SumTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SumTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let name = &self.spec.name;
        let a = number(name, argument(name, &arguments, "a")?)?;
        let b = number(name, argument(name, &arguments, "b")?)?;
        Ok(Value::Number(sum(a, b)?))
    }
}

pub struct IsPrimeTool {
    spec: ToolSpec,
}

impl IsPrimeTool {
    pub fn new() -> Self {
        Self {
            spec: ToolSpec::new(
                BuiltinTool::IsPrime.name(),
                "Check if a number is prime.",
                json!({
                    "type": "object",
                    "properties": {
                        "n": {
                            "type": "integer",
                            "description": "The number to test for primality, e.g. 7"
                        }
                    },
                    "required": ["n"]
                }),
            ),
        }
    }
}

impl Default for IsPrimeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for IsPrimeTool {
    fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        let name = &self.spec.name;
        let n = integer(name, argument(name, &arguments, "n")?)?;
        // CPU-bound for large n; runs off the async workers
        let prime = tokio::task::spawn_blocking(move || is_prime(n))
            .await
            .map_err(|e| ToolError::ExecutionError(format!("primality check failed: {e}")))?;
        Ok(Value::Bool(prime))
    }
}
