//! OpenAI-compatible client configuration.

use crate::config::ModelSettings;
use crate::credential::Credential;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client for the configured endpoint, authorized with the given credential.
///
/// No request timeout is applied unless `timeout_secs` is set.
pub fn create_client(settings: &ModelSettings, credential: &Credential) -> Result<Client<OpenAIConfig>> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = settings.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let http_client = builder.build()?;

    let config = OpenAIConfig::new()
        .with_api_base(&settings.api_base)
        .with_api_key(credential.expose());

    Ok(Client::with_config(config).with_http_client(http_client))
}
