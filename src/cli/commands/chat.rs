//! Interactive chat command.

use crate::cli::preflight;
use crate::cli::{Output, SpinnerObserver};
use crate::config::Settings;
use crate::error::Result;
use crate::session::{Session, Submission};
use console::style;
use std::io::{self, BufRead, Write};

/// Question submitted by the `example` command.
pub const EXAMPLE_QUESTION: &str = "I have 5 bananas and 7 grapes. I eat 2 bananas and give away 3 grapes. \
Then I buy a dozen apples and 2 packs of blueberries (25 each). \
How many total pieces of fruit do I have?";

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> anyhow::Result<()> {
    let Some(mut session) = preflight::open_session(&settings)? else {
        return Ok(());
    };

    println!("\n{}", style("Text To Math Problem Solver").bold().cyan());
    println!(
        "{}\n",
        style(format!(
            "Model: {}. Type a question, 'example' for a sample problem, 'history' to review, or 'exit' to quit. End a line with \\ to continue it.",
            session.agent().model_name()
        ))
        .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let Some(input) = read_question(&mut stdin.lock())? else {
            break;
        };

        match input.trim() {
            cmd if cmd.eq_ignore_ascii_case("exit") || cmd.eq_ignore_ascii_case("quit") => {
                Output::info("Goodbye!");
                break;
            }
            cmd if cmd.eq_ignore_ascii_case("history") => {
                if session.history().is_empty() {
                    Output::info("No messages yet.");
                }
                for message in session.history() {
                    Output::message(message);
                }
                println!();
            }
            cmd if cmd.eq_ignore_ascii_case("example") => {
                println!("{}", style(EXAMPLE_QUESTION).dim());
                if let Err(e) = run_turn(&mut session, EXAMPLE_QUESTION).await {
                    Output::error(&format!("Error: {}", e));
                }
            }
            _ => {
                if let Err(e) = run_turn(&mut session, &input).await {
                    Output::error(&format!("Error: {}", e));
                }
            }
        }
    }

    Ok(())
}

/// Submit one question, showing thoughts while the agent works and the answer after.
pub(super) async fn run_turn(session: &mut Session, question: &str) -> Result<()> {
    let observer = SpinnerObserver::new(Output::spinner("Generating response..."));
    let outcome = session.submit(question, &observer).await;
    observer.finish();

    match outcome? {
        Submission::Rejected { warning } => Output::warning(&warning),
        Submission::Answered(response) => {
            Output::response(response.reply.content());
            if !response.tool_calls.is_empty() {
                let used: Vec<String> = response.tool_calls.iter().map(|c| c.to_string()).collect();
                println!("{}\n", style(format!("Tools used: {}", used.join(", "))).dim());
            }
        }
    }
    Ok(())
}

/// Read one question. Lines ending in `\` continue on the next line.
///
/// Returns None at end of input.
fn read_question(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut question = String::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(if question.is_empty() { None } else { Some(question) });
        }

        let line = line.trim_end_matches(['\n', '\r']);
        match line.strip_suffix('\\') {
            Some(head) => {
                question.push_str(head);
                question.push('\n');
            }
            None => {
                question.push_str(line);
                return Ok(Some(question));
            }
        }
    }
}
