//! Incremental "thought" events emitted while the agent works.

use serde::Serialize;
use std::sync::Mutex;

/// Progress notification from a running agent turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ThoughtEvent {
    /// The model is being asked for its next step.
    Thinking { iteration: usize },
    /// A tool is about to run.
    ToolStarted { tool: String, input: String },
    /// A tool returned.
    ToolFinished { tool: String, output: String },
    /// The model replied with a name that matches no tool.
    UnknownTool { name: String },
    /// The final answer is ready.
    Answered { iterations: usize },
}

impl std::fmt::Display for ThoughtEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThoughtEvent::Thinking { iteration } => write!(f, "Thinking (step {})", iteration),
            ThoughtEvent::ToolStarted { tool, input } => write!(f, "[{}] {}", tool, input),
            ThoughtEvent::ToolFinished { tool, .. } => write!(f, "[{}] done", tool),
            ThoughtEvent::UnknownTool { name } => write!(f, "Unknown tool '{}'", name),
            ThoughtEvent::Answered { iterations } => {
                write!(f, "Answered after {} step(s)", iterations)
            }
        }
    }
}

/// Receives thought events during an agent turn.
pub trait ThoughtObserver: Send + Sync {
    fn on_thought(&self, event: &ThoughtEvent);
}

/// Discards all events.
pub struct NoopObserver;

impl ThoughtObserver for NoopObserver {
    fn on_thought(&self, _event: &ThoughtEvent) {}
}

/// Collects events in order.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ThoughtEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the events recorded so far.
    pub fn into_events(self) -> Vec<ThoughtEvent> {
        self.events.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    /// Copy of the events recorded so far.
    pub fn events(&self) -> Vec<ThoughtEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }
}

impl ThoughtObserver for RecordingObserver {
    fn on_thought(&self, event: &ThoughtEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(e) => e.into_inner().push(event.clone()),
        }
    }
}
