//! Agent system for answering questions with tool calling.
//!
//! Provides an LLM agent that can call a calculator, look things up on
//! Wikipedia, or ask the model for a worked explanation before answering.

mod assembly;
mod observer;
mod runner;

pub use assembly::{assemble, assemble_with_model, default_tools};
pub use observer::{NoopObserver, RecordingObserver, ThoughtEvent, ThoughtObserver};
pub use runner::{Agent, AgentResponse, ToolCallRecord};
