//! Free-form reasoning tool backed by the chat model.

use super::Tool;
use crate::config::Prompts;
use crate::error::{MathmateError, Result};
use crate::model::{ChatModel, ChatRequest, ModelReply};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

pub const NAME: &str = "Reasoning tool";

const DESCRIPTION: &str = "A tool for answering logic-based and reasoning questions.";

/// Asks the model for a step-by-step explanation of a sub-question.
pub struct ReasoningTool {
    model: Arc<dyn ChatModel>,
    template: String,
}

impl ReasoningTool {
    /// Create the tool from a template containing `{{question}}`.
    pub fn new(model: Arc<dyn ChatModel>, template: &str) -> Self {
        Self {
            model,
            template: template.to_string(),
        }
    }
}

#[async_trait]
impl Tool for ReasoningTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    #[instrument(skip(self))]
    async fn invoke(&self, input: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), input.to_string());
        let prompt = Prompts::render(&self.template, &vars);

        match self.model.complete(&ChatRequest::prompt(prompt)).await? {
            ModelReply::Text(text) => Ok(text),
            ModelReply::ToolCalls { content: Some(text), .. } if !text.is_empty() => Ok(text),
            ModelReply::ToolCalls { .. } => {
                Err(MathmateError::tool(NAME, "model answered with a tool call"))
            }
        }
    }
}
