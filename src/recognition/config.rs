//! Configuration for the recognition client

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default transcription instruction
pub const DEFAULT_PROMPT: &str = "Please carefully transcribe all the handwritten text in this image. Return only the transcribed text without any additional commentary or formatting.";

/// Recognition client configuration
#[derive(Debug, Deserialize)]
pub struct RecognitionConfig {
    /// API key (read from env GEMINI_API_KEY if not set)
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Service base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Candidate models, most preferred first
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Instruction sent alongside every image
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Per-call timeout in seconds; no timeout when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Upper bound on catalog pages fetched for diagnostics
    #[serde(default = "default_catalog_max_pages")]
    pub catalog_max_pages: usize,
}

fn default_base_url() -> String { "https://generativelanguage.googleapis.com".to_string() }
fn default_models() -> Vec<String> {
    vec![
        "gemini-2.0-flash".to_string(),
        "gemini-2.5-flash".to_string(),
        "gemini-2.0-pro-exp".to_string(),
    ]
}
fn default_prompt() -> String { DEFAULT_PROMPT.to_string() }
fn default_catalog_max_pages() -> usize { 10 }

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            models: default_models(),
            prompt: default_prompt(),
            request_timeout_secs: None,
            catalog_max_pages: default_catalog_max_pages(),
        }
    }
}

impl RecognitionConfig {
    /// Override the API key from the environment if present
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var(API_KEY_ENV) {
            if !val.trim().is_empty() {
                self.api_key = Some(SecretString::new(val));
            }
        }
        self
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = RecognitionConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(
            config.models,
            vec!["gemini-2.0-flash", "gemini-2.5-flash", "gemini-2.0-pro-exp"]
        );
        assert_eq!(config.prompt, DEFAULT_PROMPT);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_api_key_from_env() {
        let _env = crate::config::ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var(API_KEY_ENV, "test-key");

        let config = RecognitionConfig::default().from_env();
        assert_eq!(
            config.api_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("test-key")
        );

        // Cleanup
        std::env::remove_var(API_KEY_ENV);
    }

    #[test]
    fn test_timeout_conversion() {
        let config = RecognitionConfig {
            request_timeout_secs: Some(30),
            ..Default::default()
        };
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }
}
