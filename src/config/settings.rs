//! Configuration settings for Mathmate.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub agent: AgentSettings,
    pub wikipedia: WikipediaSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Chat model service settings.
///
/// Any OpenAI-compatible chat completions endpoint works; the defaults point at Groq.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Human-readable provider name, used in prompts for the API key.
    pub provider: String,
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature. None leaves the provider default.
    pub temperature: Option<f32>,
    /// Request timeout in seconds. None means no timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: "Groq".to_string(),
            api_base: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: None,
            timeout_secs: None,
        }
    }
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum model calls per user turn.
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { max_iterations: 10 }
    }
}

/// Wikipedia lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WikipediaSettings {
    /// Wikipedia language edition (e.g. "en", "de").
    pub language: String,
    /// Number of pages to summarize per lookup.
    pub top_k_results: usize,
    /// Maximum characters returned to the agent.
    pub max_chars: usize,
    /// Override for the MediaWiki API endpoint. Derived from `language` when unset.
    pub api_base: Option<String>,
}

impl Default for WikipediaSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            top_k_results: 3,
            max_chars: 4000,
            api_base: None,
        }
    }
}

impl WikipediaSettings {
    /// The MediaWiki API endpoint to query.
    pub fn endpoint(&self) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| format!("https://{}.wikipedia.org/w/api.php", self.language))
    }
}

/// HTTP server defaults for `mathmate serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Open sessions allowed at once. New sessions are refused beyond this.
    pub max_sessions: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_sessions: 100,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::MathmateError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathmate")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Read the API key from the configured environment variable, if set and non-blank.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.model.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_groq() {
        let settings = Settings::default();
        assert_eq!(settings.model.model, "llama-3.3-70b-versatile");
        assert_eq!(settings.model.api_key_env, "GROQ_API_KEY");
        assert!(settings.model.timeout_secs.is_none());
        assert_eq!(settings.wikipedia.top_k_results, 3);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [model]
            model = "llama-3.1-8b-instant"

            [wikipedia]
            language = "de"
            "#,
        )
        .unwrap();

        assert_eq!(settings.model.model, "llama-3.1-8b-instant");
        assert_eq!(settings.model.api_base, "https://api.groq.com/openai/v1");
        assert_eq!(settings.wikipedia.endpoint(), "https://de.wikipedia.org/w/api.php");
        assert_eq!(settings.agent.max_iterations, 10);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 8088;
        settings.model.temperature = Some(0.2);
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 8088);
        assert_eq!(loaded.model.temperature, Some(0.2));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.host, "127.0.0.1");
        assert_eq!(loaded.server.max_sessions, 100);
    }
}
