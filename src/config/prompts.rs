//! Prompt templates for Mathmate.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    pub tools: ToolPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts driving the agent loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub system: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful and professional research assistant.
Your job is to answer the user's question using the tools provided.

Follow these rules:
1. Analyze the user's question and chat history.
2. Decide if a tool is needed.
3. Use the single best tool (Calculator, Wikipedia, or Reasoning tool).
4. Combine the tool's results into a clear, human-readable answer.
5. Never output tool calls or raw JSON, only plain text results."#
                .to_string(),
        }
    }
}

/// Prompts used inside individual tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPrompts {
    /// Template for the reasoning tool. `{{question}}` is the sub-question.
    pub reasoning: String,
    /// Template asking the model to turn a word problem into one expression.
    pub calculator: String,
}

impl Default for ToolPrompts {
    fn default() -> Self {
        Self {
            reasoning: r#"You're an agent tasked with solving users' mathematical questions.
Logically arrive at the solution and provide a detailed, point-wise explanation.

Question: {{question}}
Answer:"#
                .to_string(),

            calculator: r#"Translate the math problem below into a single arithmetic expression.

Use only numbers, parentheses and the operators + - * / ^ %. Functions such as sqrt, abs, exp, ln, sin, cos, tan, floor, ceil and round are allowed, as are the constants pi and e.

Reply with the expression inside a fenced block and nothing else, for example:

```text
(37593 * 67)
```

Question: {{question}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = super::Settings::expand_path(dir);

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }

            let tools_path = custom_path.join("tools.toml");
            if tools_path.exists() {
                let content = std::fs::read_to_string(&tools_path)?;
                prompts.tools = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Load prompts as configured in settings.
    pub fn from_settings(settings: &super::Settings) -> crate::error::Result<Self> {
        Self::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// The agent system instruction with custom variables applied.
    pub fn system_instruction(&self) -> String {
        self.render_with_custom(&self.agent.system, &HashMap::new())
    }
}
