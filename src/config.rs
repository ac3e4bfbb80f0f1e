//! Application configuration
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. TOML file (`$HANDWRITING_CONFIG`, else `config.toml`; optional)
//! 3. `HANDWRITING__<SECTION>__<KEY>` environment variables
//! 4. `GEMINI_API_KEY` for the recognition API key
//!
//! A `.env` file in the working directory is loaded into the environment
//! first.

use secrecy::ExposeSecret;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::recognition::RecognitionConfig;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "HANDWRITING_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const ENV_PREFIX: &str = "HANDWRITING";

/// Serializes tests that mutate process environment variables
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("GEMINI_API_KEY not found in environment or config file")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub recognition: RecognitionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Directory with the front-end page
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 5000 }
fn default_max_body_bytes() -> usize { 16 * 1024 * 1024 }
fn default_static_dir() -> PathBuf { PathBuf::from("static") }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            static_dir: default_static_dir(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load from `.env`, the config file and the environment, then validate
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Self::from_file(&path)?;
        config.recognition = config.recognition.from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file (missing file is fine) plus prefixed env vars
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load from a TOML string, without touching the environment
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.recognition.api_key {
            Some(key) if !key.expose_secret().trim().is_empty() => {}
            _ => return Err(ConfigError::MissingApiKey),
        }

        if self.recognition.models.is_empty() {
            return Err(ConfigError::Invalid(
                "recognition.models must name at least one model".to_string(),
            ));
        }

        if self.recognition.models.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "recognition.models contains a blank model name".to_string(),
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_body_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
