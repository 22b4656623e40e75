//! CLI output formatting utilities.

use crate::agent::{ThoughtEvent, ThoughtObserver};
use crate::conversation::{Message, Role};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one role-tagged chat message.
    pub fn message(message: &Message) {
        let label = match message.role() {
            Role::User => style("You:").green().bold(),
            Role::Assistant => style("Mathmate:").cyan().bold(),
        };
        println!("{} {}", label, message.content());
    }

    /// Print the final answer of a turn.
    pub fn response(content: &str) {
        Self::header("Response:");
        println!("{}\n", style(content).green());
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Shows thought events as collapsed one-liners above a spinner.
pub struct SpinnerObserver {
    spinner: ProgressBar,
}

impl SpinnerObserver {
    pub fn new(spinner: ProgressBar) -> Self {
        Self { spinner }
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ThoughtObserver for SpinnerObserver {
    fn on_thought(&self, event: &ThoughtEvent) {
        match event {
            ThoughtEvent::Thinking { iteration } if *iteration > 1 => {
                self.spinner
                    .set_message(format!("Generating response (step {})...", iteration));
            }
            ThoughtEvent::Thinking { .. } | ThoughtEvent::Answered { .. } => {}
            ThoughtEvent::ToolStarted { tool, input } => {
                self.spinner.println(format!(
                    "  {}",
                    style(format!("[{}] {}", tool, preview(input, 80))).dim()
                ));
            }
            ThoughtEvent::ToolFinished { tool, output } => {
                self.spinner.println(format!(
                    "  {} {}",
                    style("✓").green(),
                    style(format!("[{}] {}", tool, preview(output, 80))).dim()
                ));
            }
            ThoughtEvent::UnknownTool { name } => {
                self.spinner.println(format!(
                    "  {} {}",
                    style("✗").red(),
                    style(format!("unknown tool '{}'", name)).dim()
                ));
            }
        }
    }
}

/// Single-line preview, cut at `max_len` characters.
fn preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_len {
        content
    } else {
        let cut: String = content.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview() {
        assert_eq!(preview("Answer: 69", 80), "Answer: 69");
        assert_eq!(preview("line one\nline two", 80), "line one line two");
        assert_eq!(preview("abcdefghij", 6), "abc...");
        assert_eq!(preview("ééééé", 4), "é...");
    }
}
