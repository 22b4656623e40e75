//! CLI module for Mathmate.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{Output, SpinnerObserver};

use clap::{Parser, Subcommand};

/// Mathmate - Text to math problem solver
///
/// Ask math and reasoning questions in plain language. An LLM agent answers,
/// using a calculator, Wikipedia, or a step-by-step reasoning tool when needed.
#[derive(Parser, Debug)]
#[command(name = "mathmate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session (default)
    Chat,

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        question: String,
    },

    /// Start HTTP API server with per-client sessions
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
