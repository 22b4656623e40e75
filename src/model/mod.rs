//! Chat model abstraction.
//!
//! The agent talks to the model only through [`ChatModel`], so the hosted
//! service can be swapped for a scripted fake in tests.

mod openai;
#[cfg(test)]
pub(crate) mod testing;

pub use openai::OpenAiChatModel;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// One message in a model request.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelMessage {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    },
    Tool {
        call_id: String,
        content: String,
    },
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub id: String,
    /// Wire name of the tool.
    pub name: String,
    /// Raw JSON arguments.
    pub arguments: String,
}

/// A tool as advertised to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A single chat completion request.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<ModelMessage>,
    pub tools: Vec<ToolSpec>,
}

impl ChatRequest {
    /// A request consisting of one user prompt and no tools.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            messages: vec![ModelMessage::User(text.into())],
            tools: Vec::new(),
        }
    }

    /// Text of the last user message, if any.
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            ModelMessage::User(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

/// What the model answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// A final natural-language answer.
    Text(String),
    /// The model wants tools run before it answers.
    ToolCalls {
        content: Option<String>,
        calls: Vec<ToolCallRequest>,
    },
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion.
    async fn complete(&self, request: &ChatRequest) -> Result<ModelReply>;

    /// Identifier of the underlying model.
    fn model_name(&self) -> &str;
}
