//! OpenAI-compatible chat completions implementation.

use super::{ChatModel, ChatRequest, ModelMessage, ModelReply, ToolCallRequest, ToolSpec};
use crate::config::ModelSettings;
use crate::credential::Credential;
use crate::error::{MathmateError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObject,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model served by an OpenAI-compatible endpoint (Groq by default).
pub struct OpenAiChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiChatModel {
    /// Create a model client from settings and a credential.
    pub fn new(settings: &ModelSettings, credential: &Credential) -> Result<Self> {
        Ok(Self {
            client: create_client(settings, credential)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    #[instrument(skip(self, request), fields(model = %self.model, messages = request.messages.len()))]
    async fn complete(&self, request: &ChatRequest) -> Result<ModelReply> {
        let messages = request
            .messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages);
        if !request.tools.is_empty() {
            builder.tools(request.tools.iter().map(to_tool).collect::<Vec<_>>());
        }
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let api_request = builder
            .build()
            .map_err(|e| MathmateError::Model(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .chat()
            .create(api_request)
            .await
            .map_err(|e| MathmateError::Model(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MathmateError::Model("No response from model".to_string()))?;

        match choice.message.tool_calls {
            Some(tool_calls) if !tool_calls.is_empty() => {
                debug!("Model requested {} tool call(s)", tool_calls.len());
                Ok(ModelReply::ToolCalls {
                    content: choice.message.content,
                    calls: tool_calls
                        .into_iter()
                        .map(|call| ToolCallRequest {
                            id: call.id,
                            name: call.function.name,
                            arguments: call.function.arguments,
                        })
                        .collect(),
                })
            }
            _ => Ok(ModelReply::Text(choice.message.content.unwrap_or_default())),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn to_request_message(message: &ModelMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message {
        ModelMessage::System(text) => ChatCompletionRequestSystemMessageArgs::default()
            .content(text.clone())
            .build()
            .map_err(build_error)?
            .into(),
        ModelMessage::User(text) => ChatCompletionRequestUserMessageArgs::default()
            .content(text.clone())
            .build()
            .map_err(build_error)?
            .into(),
        ModelMessage::Assistant {
            content,
            tool_calls,
        } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(text) = content {
                args.content(text.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(tool_calls.iter().map(to_message_tool_call).collect::<Vec<_>>());
            }
            args.build().map_err(build_error)?.into()
        }
        ModelMessage::Tool { call_id, content } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id.clone())
            .content(content.clone())
            .build()
            .map_err(build_error)?
            .into(),
    };
    Ok(built)
}

fn to_message_tool_call(call: &ToolCallRequest) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: call.id.clone(),
        r#type: ChatCompletionToolType::Function,
        function: FunctionCall {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        },
    }
}

fn to_tool(spec: &ToolSpec) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: spec.name.clone(),
            description: Some(spec.description.clone()),
            parameters: Some(spec.parameters.clone()),
            strict: None,
        },
    }
}

fn build_error(e: async_openai::error::OpenAIError) -> MathmateError {
    MathmateError::Model(format!("Failed to build message: {}", e))
}
