//! One user session: the conversation plus the submit state machine.

use crate::agent::{Agent, AgentResponse, ThoughtObserver};
use crate::conversation::{Conversation, Message};
use crate::credential::Credential;
use crate::error::Result;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Warning shown when a blank question is submitted.
pub const EMPTY_INPUT_WARNING: &str = "Please enter a question.";

/// Where the session is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Waiting for a question.
    Idle,
    /// An agent call is in flight.
    Processing,
}

/// Outcome of a submit action.
#[derive(Debug)]
pub enum Submission {
    /// Input was blank; nothing was recorded.
    Rejected { warning: String },
    /// The agent answered; its reply has been appended.
    Answered(AgentResponse),
}

/// Resets the state to `Idle` when the turn ends, even if the future is dropped.
struct ProcessingGuard<'a>(&'a mut SessionState);

impl<'a> ProcessingGuard<'a> {
    fn enter(state: &'a mut SessionState) -> Self {
        *state = SessionState::Processing;
        Self(state)
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = SessionState::Idle;
    }
}

/// An interactive session owning its conversation.
pub struct Session {
    id: Uuid,
    agent: Agent,
    conversation: Conversation,
    state: SessionState,
}

impl Session {
    /// Start a session with an empty conversation.
    pub fn new(agent: Agent) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent,
            conversation: Conversation::new(),
            state: SessionState::Idle,
        }
    }

    /// Check the credential, then build the agent and start a session.
    ///
    /// `build` is never called when the credential is missing or blank.
    pub fn bootstrap<F>(credential: Option<&str>, build: F) -> Result<Self>
    where
        F: FnOnce(&Credential) -> Result<Agent>,
    {
        let credential = Credential::parse(credential)?;
        let agent = build(&credential)?;
        Ok(Self::new(agent))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// The full conversation so far.
    pub fn history(&self) -> &[Message] {
        self.conversation.all()
    }

    /// Submit a question.
    ///
    /// Blank input is rejected without touching the conversation. Otherwise the
    /// user message is recorded first; the assistant reply is recorded only if
    /// the agent succeeds, and any agent error is returned unchanged.
    #[instrument(skip(self, input, observer), fields(session = %self.id))]
    pub async fn submit(
        &mut self,
        input: &str,
        observer: &dyn ThoughtObserver,
    ) -> Result<Submission> {
        let question = input.trim();
        if question.is_empty() {
            warn!("Ignoring blank question");
            return Ok(Submission::Rejected {
                warning: EMPTY_INPUT_WARNING.to_string(),
            });
        }

        self.conversation.append(Message::user(question));
        info!("Question submitted ({} messages in session)", self.conversation.len());

        let outcome = {
            let _processing = ProcessingGuard::enter(&mut self.state);
            self.agent.respond(self.conversation.all(), observer).await
        };

        let response = outcome?;
        self.conversation.append(response.reply.clone());
        Ok(Submission::Answered(response))
    }
}
