//! Mathmate - Text to math problem solver
//!
//! Ask math and reasoning questions in plain language. A tool-calling LLM
//! agent answers, reaching for a calculator, Wikipedia, or a step-by-step
//! reasoning tool when the question needs one.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `credential` - API key validation
//! - `model` - Chat model abstraction and the OpenAI-compatible backend
//! - `tools` - Calculator, Wikipedia and reasoning tools
//! - `agent` - Agent assembly and the tool-calling loop
//! - `conversation` - Role-tagged message history
//! - `session` - One user's conversation and the submit cycle
//! - `cli` - Command line and HTTP front ends
//!
//! # Example
//!
//! ```rust,no_run
//! use mathmate::agent::{self, NoopObserver};
//! use mathmate::config::{Prompts, Settings};
//! use mathmate::session::{Session, Submission};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let prompts = Prompts::from_settings(&settings)?;
//!     let key = settings.api_key_from_env();
//!
//!     let mut session = Session::bootstrap(key.as_deref(), |credential| {
//!         agent::assemble(&settings, &prompts, credential)
//!     })?;
//!
//!     if let Submission::Answered(response) = session.submit("What is 17 * 23?", &NoopObserver).await? {
//!         println!("{}", response.reply.content());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod credential;
pub mod error;
pub mod model;
pub mod openai;
pub mod session;
pub mod tools;

pub use error::{MathmateError, Result};
