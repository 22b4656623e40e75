//! Tools with canned behavior for tests.

use super::Tool;
use crate::error::{MathmateError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Returns a fixed output and records every input it receives.
pub(crate) struct StaticTool {
    name: String,
    output: String,
    inputs: Mutex<Vec<String>>,
}

impl StaticTool {
    pub(crate) fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.to_string(),
            output: output.to_string(),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn arc(name: &str, output: &str) -> Arc<dyn Tool> {
        Arc::new(Self::new(name, output))
    }

    pub(crate) fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "A canned tool"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        self.inputs.lock().unwrap().push(input.to_string());
        Ok(self.output.clone())
    }
}

/// Always fails, like an unreachable backend.
pub(crate) struct FailingTool {
    pub(crate) name: String,
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "A tool whose backend is down"
    }

    async fn invoke(&self, _input: &str) -> Result<String> {
        Err(MathmateError::tool(&self.name, "backend unreachable"))
    }
}
