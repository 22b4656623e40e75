//! Agent runner with tool calling loop.

use super::observer::{ThoughtEvent, ThoughtObserver};
use crate::config::Prompts;
use crate::conversation::{Message, Role};
use crate::error::{MathmateError, Result};
use crate::model::{ChatModel, ChatRequest, ModelMessage, ModelReply, ToolCallRequest};
use crate::tools::{parse_tool_input, ToolRegistry};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default cap on model calls per user turn.
const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Agent combining a chat model, its tools and a fixed system instruction.
///
/// Holds no conversation state; every call receives the full history.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    system_prompt: String,
    max_iterations: usize,
}

impl Agent {
    /// Create a new agent with the default system instruction.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        Self {
            model,
            tools,
            system_prompt: Prompts::default().agent.system,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Return `conversation` with exactly one assistant reply appended.
    pub async fn invoke(
        &self,
        conversation: &[Message],
        observer: &dyn ThoughtObserver,
    ) -> Result<Vec<Message>> {
        let response = self.respond(conversation, observer).await?;
        let mut extended = conversation.to_vec();
        extended.push(response.reply);
        Ok(extended)
    }

    /// Produce the assistant reply for a conversation.
    #[instrument(skip_all, fields(messages = history.len()))]
    pub async fn respond(
        &self,
        history: &[Message],
        observer: &dyn ThoughtObserver,
    ) -> Result<AgentResponse> {
        if history.is_empty() {
            return Err(MathmateError::InvalidInput(
                "conversation is empty".to_string(),
            ));
        }

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ModelMessage::System(self.system_prompt.clone()));
        messages.extend(history.iter().map(|m| match m.role() {
            Role::User => ModelMessage::User(m.content().to_string()),
            Role::Assistant => ModelMessage::Assistant {
                content: Some(m.content().to_string()),
                tool_calls: Vec::new(),
            },
        }));

        let tools = self.tools.definitions();
        let mut tool_calls_made = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(MathmateError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);
            observer.on_thought(&ThoughtEvent::Thinking {
                iteration: iterations,
            });

            let request = ChatRequest {
                messages: messages.clone(),
                tools: tools.clone(),
            };

            match self.model.complete(&request).await? {
                ModelReply::Text(content) => {
                    observer.on_thought(&ThoughtEvent::Answered { iterations });
                    return Ok(AgentResponse {
                        reply: Message::assistant(content),
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
                ModelReply::ToolCalls { content, calls } => {
                    messages.push(ModelMessage::Assistant {
                        content,
                        tool_calls: calls.clone(),
                    });

                    for call in &calls {
                        let record = self.execute_tool_call(call, observer).await?;
                        messages.push(ModelMessage::Tool {
                            call_id: call.id.clone(),
                            content: record.output.clone(),
                        });
                        tool_calls_made.push(record);
                    }
                }
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    ///
    /// Unknown tools and unparsable arguments are reported back to the model;
    /// a failing tool backend ends the turn with its error.
    async fn execute_tool_call(
        &self,
        call: &ToolCallRequest,
        observer: &dyn ThoughtObserver,
    ) -> Result<ToolCallRecord> {
        let Some(tool) = self.tools.resolve(&call.name) else {
            warn!("Model called unknown tool: {}", call.name);
            observer.on_thought(&ThoughtEvent::UnknownTool {
                name: call.name.clone(),
            });
            return Ok(ToolCallRecord {
                name: call.name.clone(),
                input: call.arguments.clone(),
                output: format!(
                    "Unknown tool: {}. Available tools: {}",
                    call.name,
                    self.tools.names().join(", ")
                ),
            });
        };

        let input = match parse_tool_input(&call.arguments) {
            Ok(input) => input,
            Err(e) => {
                return Ok(ToolCallRecord {
                    name: tool.name().to_string(),
                    input: call.arguments.clone(),
                    output: format!("Failed to parse tool call: {}", e),
                })
            }
        };

        info!("Agent calling tool: {} with input: {}", tool.name(), input);
        observer.on_thought(&ThoughtEvent::ToolStarted {
            tool: tool.name().to_string(),
            input: input.clone(),
        });

        let output = tool.invoke(&input).await.inspect_err(|e| {
            warn!("Tool {} failed: {}", tool.name(), e);
        })?;

        observer.on_thought(&ThoughtEvent::ToolFinished {
            tool: tool.name().to_string(),
            output: output.clone(),
        });

        Ok(ToolCallRecord {
            name: tool.name().to_string(),
            input,
            output,
        })
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The assistant message to append to the conversation.
    pub reply: Message,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (model calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolCallRecord {
    /// Display name of the tool called.
    pub name: String,
    /// Input passed to the tool.
    pub input: String,
    /// Text returned to the model.
    pub output: String,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::observer::{NoopObserver, RecordingObserver};
    use crate::model::testing::{tool_call, FnModel, ScriptedModel};
    use crate::tools::testing::{FailingTool, StaticTool};
    use crate::tools::{Calculator, Tool};

    const FRUIT_PROBLEM: &str = "I have 5 bananas and 7 grapes. I eat 2 bananas and give away 3 grapes. \
        Then I buy a dozen apples and 2 packs of blueberries (25 each). \
        How many total pieces of fruit do I have?";

    fn registry(tools: Vec<Arc<dyn Tool>>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(tool).unwrap();
        }
        registry
    }

    #[test]
    fn test_tool_call_record_display() {
        let record = ToolCallRecord {
            name: "Calculator".to_string(),
            input: "2*25".to_string(),
            output: "Answer: 50".to_string(),
        };
        assert_eq!(format!("{}", record), "Calculator(2*25)");
    }

    #[tokio::test]
    async fn test_direct_answer_without_tools() {
        let model = Arc::new(ScriptedModel::new(vec![ModelReply::Text("Hello!".to_string())]));
        let agent = Agent::new(model.clone(), ToolRegistry::new());

        let response = agent
            .respond(&[Message::user("Hi")], &NoopObserver)
            .await
            .unwrap();

        assert_eq!(response.reply.role(), Role::Assistant);
        assert_eq!(response.reply.content(), "Hello!");
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.iterations, 1);

        let requests = model.requests();
        assert_eq!(
            requests[0].messages[0],
            ModelMessage::System(Prompts::default().agent.system)
        );
    }

    #[tokio::test]
    async fn test_fruit_problem_routes_through_calculator() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::ToolCalls {
                content: None,
                calls: vec![tool_call("call_1", "Calculator", "(5 - 2) + (7 - 3) + 12 + 2 * 25")],
            },
            ModelReply::Text(
                "You have 3 bananas, 4 grapes, 12 apples and 50 blueberries: 69 pieces of fruit."
                    .to_string(),
            ),
        ]));
        let agent = Agent::new(model.clone(), registry(vec![Arc::new(Calculator::new())]));
        let observer = RecordingObserver::new();

        let response = agent
            .respond(&[Message::user(FRUIT_PROBLEM)], &observer)
            .await
            .unwrap();

        assert!(response.reply.content().contains("69"));
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "Calculator");
        assert_eq!(response.tool_calls[0].output, "Answer: 69");

        // The tool result is fed back before the final answer.
        let second = &model.requests()[1];
        assert_eq!(
            second.messages.last(),
            Some(&ModelMessage::Tool {
                call_id: "call_1".to_string(),
                content: "Answer: 69".to_string(),
            })
        );

        let events = observer.into_events();
        assert!(events.contains(&ThoughtEvent::ToolFinished {
            tool: "Calculator".to_string(),
            output: "Answer: 69".to_string(),
        }));
        assert_eq!(events.last(), Some(&ThoughtEvent::Answered { iterations: 2 }));
    }

    #[tokio::test]
    async fn test_wire_name_resolves_to_display_name() {
        let reasoning = Arc::new(StaticTool::new("Reasoning tool", "Because 2 is even."));
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::ToolCalls {
                content: None,
                calls: vec![tool_call("c1", "Reasoning_tool", "Is 2 even?")],
            },
            ModelReply::Text("Yes.".to_string()),
        ]));
        let agent = Agent::new(model, registry(vec![reasoning.clone() as Arc<dyn Tool>]));

        let response = agent
            .respond(&[Message::user("Is 2 even?")], &NoopObserver)
            .await
            .unwrap();

        assert_eq!(reasoning.inputs(), vec!["Is 2 even?".to_string()]);
        assert_eq!(response.tool_calls[0].name, "Reasoning tool");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_model() {
        let model = Arc::new(ScriptedModel::new(vec![
            ModelReply::ToolCalls {
                content: None,
                calls: vec![tool_call("c1", "web_browser", "weather")],
            },
            ModelReply::Text("I can't browse.".to_string()),
        ]));
        let agent = Agent::new(model.clone(), registry(vec![StaticTool::arc("Wikipedia", "")]));

        let response = agent
            .respond(&[Message::user("weather?")], &NoopObserver)
            .await
            .unwrap();

        assert_eq!(response.reply.content(), "I can't browse.");
        match model.requests()[1].messages.last() {
            Some(ModelMessage::Tool { content, .. }) => {
                assert!(content.starts_with("Unknown tool: web_browser"));
                assert!(content.contains("Wikipedia"));
            }
            other => panic!("Expected tool message, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_tool_failure_propagates() {
        let model = Arc::new(ScriptedModel::new(vec![ModelReply::ToolCalls {
            content: None,
            calls: vec![tool_call("c1", "Wikipedia", "Euler")],
        }]));
        let agent = Agent::new(
            model.clone(),
            registry(vec![Arc::new(FailingTool {
                name: "Wikipedia".to_string(),
            })]),
        );

        let err = agent
            .respond(&[Message::user("Who was Euler?")], &NoopObserver)
            .await
            .unwrap_err();

        assert!(matches!(err, MathmateError::Tool { ref name, .. } if name == "Wikipedia"));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_conversation_is_rejected() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let agent = Agent::new(model.clone(), ToolRegistry::new());

        let err = agent.respond(&[], &NoopObserver).await.unwrap_err();
        assert!(matches!(err, MathmateError::InvalidInput(_)));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_iteration_cap() {
        let model = Arc::new(FnModel(|_: &ChatRequest| ModelReply::ToolCalls {
            content: None,
            calls: vec![tool_call("loop", "Calculator", "1+1")],
        }));
        let agent = Agent::new(model, registry(vec![Arc::new(Calculator::new())]))
            .with_max_iterations(3);

        let err = agent
            .respond(&[Message::user("loop forever")], &NoopObserver)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("maximum iterations (3)"));
    }

    #[tokio::test]
    async fn test_invoke_appends_one_assistant_message() {
        let model = Arc::new(ScriptedModel::new(vec![ModelReply::Text("4".to_string())]));
        let agent = Agent::new(model, ToolRegistry::new());
        let conversation = vec![Message::user("2+2?")];

        let extended = agent.invoke(&conversation, &NoopObserver).await.unwrap();

        assert_eq!(extended.len(), 2);
        assert_eq!(extended[0], conversation[0]);
        assert_eq!(extended[1].role(), Role::Assistant);
        assert_eq!(extended[1].content(), "4");
    }

    #[tokio::test]
    async fn test_replay_yields_same_answer() {
        let model = Arc::new(FnModel(|request: &ChatRequest| {
            let has_tool_result = request
                .messages
                .iter()
                .any(|m| matches!(m, ModelMessage::Tool { .. }));
            if has_tool_result {
                ModelReply::Text("The total is 69.".to_string())
            } else {
                ModelReply::ToolCalls {
                    content: None,
                    calls: vec![tool_call("c1", "Calculator", "5-2 + 7-3 + 12 + 2*25")],
                }
            }
        }));
        let agent = Agent::new(model, registry(vec![Arc::new(Calculator::new())]));
        let conversation = vec![Message::user(FRUIT_PROBLEM)];

        let first = agent.respond(&conversation, &NoopObserver).await.unwrap();
        let second = agent.respond(&conversation, &NoopObserver).await.unwrap();

        assert_eq!(first.reply.content(), second.reply.content());
        assert!(first.reply.content().contains("69"));
    }
}
