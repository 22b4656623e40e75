//! Pre-flight checks before talking to the model service.
//!
//! The API key is the only startup precondition. Without it no agent is
//! built and no request is made.

use crate::agent;
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::error::{MathmateError, Result};
use crate::session::Session;
use console::Term;
use tracing::debug;

/// Find the API key: the configured environment variable first, then a masked prompt.
///
/// Returns None when neither yields a key.
pub fn api_key(settings: &Settings) -> Result<Option<String>> {
    if let Some(key) = settings.api_key_from_env() {
        debug!("Using API key from {}", settings.model.api_key_env);
        return Ok(Some(key));
    }

    if !console::user_attended() {
        return Ok(None);
    }

    let term = Term::stderr();
    term.write_str(&format!("{} API Key: ", settings.model.provider))?;
    let key = term.read_secure_line()?;
    Ok(Some(key).filter(|k| !k.trim().is_empty()))
}

/// Message shown when no key is available.
pub fn missing_key_message(settings: &Settings) -> String {
    format!(
        "Please add your {} API key to continue (set {} or enter it when prompted).",
        settings.model.provider, settings.model.api_key_env
    )
}

/// Resolve the credential and start a session.
///
/// Returns None, after telling the user, when no key was provided.
pub fn open_session(settings: &Settings) -> Result<Option<Session>> {
    let prompts = Prompts::from_settings(settings)?;
    let key = api_key(settings)?;

    match Session::bootstrap(key.as_deref(), |credential| {
        agent::assemble(settings, &prompts, credential)
    }) {
        Ok(session) => Ok(Some(session)),
        Err(MathmateError::MissingCredential) => {
            Output::info(&missing_key_message(settings));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_message_names_provider_and_variable() {
        let message = missing_key_message(&Settings::default());
        assert!(message.starts_with("Please add your Groq API key to continue"));
        assert!(message.contains("GROQ_API_KEY"));
    }
}
