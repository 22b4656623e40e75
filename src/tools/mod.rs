//! Tools the agent can call.
//!
//! Every tool has the same text-in, text-out contract. The model sees each
//! one as a function with a single string parameter named `input`.

mod calculator;
mod reasoning;
#[cfg(test)]
pub(crate) mod testing;
mod wikipedia;

pub use calculator::{evaluate_expression, Calculator};
pub use reasoning::ReasoningTool;
pub use wikipedia::WikipediaTool;

use crate::error::{MathmateError, Result};
use crate::model::ToolSpec;
use async_trait::async_trait;
use std::sync::Arc;

/// A named callable exposed to the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Display name, unique within a registry.
    fn name(&self) -> &str;

    /// Natural-language description the model uses to decide applicability.
    fn description(&self) -> &str;

    /// Run the tool. Backend failures are returned as-is.
    async fn invoke(&self, input: &str) -> Result<String>;
}

/// Function name sent to the model for a display name.
///
/// Characters outside `[A-Za-z0-9_-]` become `_`.
pub fn wire_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// JSON schema shared by all tools.
fn input_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "input": {
                "type": "string",
                "description": "The text to pass to the tool"
            }
        },
        "required": ["input"]
    })
}

/// Extract the tool input from the model's raw arguments.
///
/// Accepts `{"input": "..."}`, an object with a single string field, a bare
/// JSON string, or plain text.
pub fn parse_tool_input(arguments: &str) -> Result<String> {
    let trimmed = arguments.trim();
    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => return Ok(trimmed.to_string()),
    };

    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Object(map) => {
            if let Some(input) = map.get("input").and_then(|v| v.as_str()) {
                return Ok(input.to_string());
            }
            let mut strings = map.values().filter_map(|v| v.as_str());
            match (strings.next(), strings.next()) {
                (Some(only), None) => Ok(only.to_string()),
                _ => Err(MathmateError::Agent(
                    "Missing 'input' argument".to_string(),
                )),
            }
        }
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(MathmateError::Agent(format!(
            "Invalid tool arguments: {}",
            other
        ))),
    }
}

/// Ordered set of tools with unique names.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Fails if its display or wire name is already taken.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let wire = wire_name(tool.name());
        if self
            .tools
            .iter()
            .any(|t| t.name() == tool.name() || wire_name(t.name()) == wire)
        {
            return Err(MathmateError::Config(format!(
                "Duplicate tool name: {}",
                tool.name()
            )));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Result<Self> {
        self.register(tool)?;
        Ok(self)
    }

    /// Display names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Look up a tool by display name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Resolve a name sent back by the model. Wire names and display names both match.
    pub fn resolve(&self, called: &str) -> Option<&Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|t| wire_name(t.name()) == called)
            .or_else(|| self.get(called))
    }

    /// Tool definitions to advertise to the model.
    pub fn definitions(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec {
                name: wire_name(t.name()),
                description: t.description().to_string(),
                parameters: input_schema(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
