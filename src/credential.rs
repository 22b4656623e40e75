//! Model service credential.

use crate::error::{MathmateError, Result};

/// Secret key authorizing calls to the hosted model service.
///
/// The key is never printed: `Debug` is redacted.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Accept a credential, rejecting absent or blank input.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Self(key.to_string())),
            _ => Err(MathmateError::MissingCredential),
        }
    }

    /// The raw secret, for handing to the model client.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}
