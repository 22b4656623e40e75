//! Deterministic chat models for tests.

use super::{ChatModel, ChatRequest, ModelReply, ToolCallRequest};
use crate::error::{MathmateError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays a fixed script of replies and records every request.
pub(crate) struct ScriptedModel {
    replies: Mutex<VecDeque<std::result::Result<ModelReply, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub(crate) fn new(replies: Vec<ModelReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A model whose next call fails with the given message.
    pub(crate) fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(message.to_string())])),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, request: &ChatRequest) -> Result<ModelReply> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(MathmateError::Model(message)),
            None => Err(MathmateError::Model("script exhausted".to_string())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Answers every request by applying a function to it.
pub(crate) struct FnModel<F>(pub(crate) F);

#[async_trait]
impl<F> ChatModel for FnModel<F>
where
    F: Fn(&ChatRequest) -> ModelReply + Send + Sync,
{
    async fn complete(&self, request: &ChatRequest) -> Result<ModelReply> {
        Ok((self.0)(request))
    }

    fn model_name(&self) -> &str {
        "fn"
    }
}

/// A tool call with `{"input": ...}` arguments.
pub(crate) fn tool_call(id: &str, name: &str, input: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_string(),
        name: name.to_string(),
        arguments: serde_json::json!({ "input": input }).to_string(),
    }
}
