//! Ask command implementation.

use super::chat::run_turn;
use crate::cli::preflight;
use crate::config::Settings;
use crate::session::Session;
use anyhow::{Context, Result};

/// Run the ask command: one question, one answer.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    let Some(mut session) = preflight::open_session(&settings)? else {
        return Ok(());
    };

    answer(&mut session, question).await
}

/// Answer a single question. Failures are returned, not printed.
async fn answer(session: &mut Session, question: &str) -> Result<()> {
    run_turn(session, question)
        .await
        .context("Failed to answer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::model::testing::ScriptedModel;
    use crate::model::ModelReply;
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_failure_is_returned_with_context() {
        let model = Arc::new(ScriptedModel::failing("rate limited"));
        let mut session = Session::new(Agent::new(model, ToolRegistry::new()));

        let err = answer(&mut session, "2+2?").await.unwrap_err();

        let chain = format!("{:#}", err);
        assert!(chain.starts_with("Failed to answer"));
        assert!(chain.contains("rate limited"));
    }

    #[tokio::test]
    async fn test_answer_succeeds() {
        let model = Arc::new(ScriptedModel::new(vec![ModelReply::Text("4".to_string())]));
        let mut session = Session::new(Agent::new(model, ToolRegistry::new()));

        answer(&mut session, "2+2?").await.unwrap();
        assert_eq!(session.history().len(), 2);
    }
}
