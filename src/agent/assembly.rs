//! Wiring of the model, the three tools and the system instruction.

use super::Agent;
use crate::config::{Prompts, Settings};
use crate::credential::Credential;
use crate::error::Result;
use crate::model::{ChatModel, OpenAiChatModel};
use crate::tools::{Calculator, ReasoningTool, ToolRegistry, WikipediaTool};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Placeholder the tools substitute with the sub-question on each call.
const QUESTION_VAR: &str = "question";

/// Build the Wikipedia, Calculator and Reasoning tools around one model.
pub fn default_tools(
    model: Arc<dyn ChatModel>,
    settings: &Settings,
    prompts: &Prompts,
) -> Result<ToolRegistry> {
    // `{{question}}` is filled per call, so a config variable of that name must not consume it.
    let mut vars: HashMap<String, String> = prompts.variables.clone();
    vars.remove(QUESTION_VAR);
    let calculator_template = Prompts::render(&prompts.tools.calculator, &vars);
    let reasoning_template = Prompts::render(&prompts.tools.reasoning, &vars);

    ToolRegistry::new()
        .with(Arc::new(WikipediaTool::new(&settings.wikipedia)?))?
        .with(Arc::new(
            Calculator::new().with_translator(model.clone(), &calculator_template),
        ))?
        .with(Arc::new(ReasoningTool::new(model, &reasoning_template)))
}

/// Assemble an agent around an already-built model.
pub fn assemble_with_model(
    model: Arc<dyn ChatModel>,
    settings: &Settings,
    prompts: &Prompts,
) -> Result<Agent> {
    let tools = default_tools(model.clone(), settings, prompts)?;
    info!(
        "Assembled agent on {} with tools: {}",
        model.model_name(),
        tools.names().join(", ")
    );

    Ok(Agent::new(model, tools)
        .with_system_prompt(&prompts.system_instruction())
        .with_max_iterations(settings.agent.max_iterations))
}

/// Assemble the agent against the configured model service.
pub fn assemble(settings: &Settings, prompts: &Prompts, credential: &Credential) -> Result<Agent> {
    let model: Arc<dyn ChatModel> = Arc::new(OpenAiChatModel::new(&settings.model, credential)?);
    assemble_with_model(model, settings, prompts)
}
