//! # Application Configuration
//!
//! This module defines the configuration structure for the `glr-server` and
//! provides the logic for loading it from an optional `config.yml` file and
//! environment variables.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use glr::types::{DEFAULT_API_URL, DEFAULT_MISSING_VALUE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use glr::{ExtractionSettings, ProviderConfig};
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates an explicitly requested configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    pub port: u16,
    /// The chat-completions provider used by every extraction mode.
    pub provider: ProviderConfig,
    pub extraction: ExtractionConfig,
    /// Upper bound for a whole multipart request, in bytes.
    pub max_upload_bytes: usize,
}

/// Extraction tunables.
#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    pub voting_rounds: usize,
    pub missing_value: String,
    /// How much of the combined report text is echoed back to the client.
    pub preview_chars: usize,
}

impl ExtractionConfig {
    pub fn settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            voting_rounds: self.voting_rounds,
            missing_value: self.missing_value.clone(),
        }
    }
}

const DEFAULT_PORT: i64 = 9090;
const DEFAULT_PREVIEW_CHARS: i64 = 20_000;
const DEFAULT_MAX_UPLOAD_BYTES: i64 = 50 * 1024 * 1024;

// Reads a file and substitutes `${VAR}` references from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}").unwrap();
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from defaults, a file and environment variables.
///
/// - Without an override, `config.yml` next to the crate is used when present.
///   An override path that does not exist is an error.
/// - `PORT` overrides the top-level port.
/// - Nested keys are overridden by `GLR_...` variables (e.g. `GLR_PROVIDER__MODEL_NAME`).
/// - `OPENROUTER_API_KEY` supplies the provider key when none was configured.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults.
        .set_default("port", DEFAULT_PORT)?
        .set_default("provider.api_url", DEFAULT_API_URL)?
        .set_default("provider.model_name", DEFAULT_MODEL)?
        .set_default("provider.timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
        .set_default("extraction.voting_rounds", 3)?
        .set_default("extraction.missing_value", DEFAULT_MISSING_VALUE)?
        .set_default("extraction.preview_chars", DEFAULT_PREVIEW_CHARS)?
        .set_default("max_upload_bytes", DEFAULT_MAX_UPLOAD_BYTES)?;

    // Layer 2: Config file (optional unless explicitly requested).
    let config_path = match config_path_override {
        Some(path) => path.to_string(),
        None => format!("{base_path}/config.yml"),
    };
    match read_and_substitute(&config_path)? {
        Some(content) => {
            info!("Loading configuration from '{config_path}'.");
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if config_path_override.is_some() => {
            return Err(ConfigError::NotFound(format!(
                "Config file not found at '{config_path}'."
            )));
        }
        None => info!("No config file at '{config_path}'; using defaults and environment."),
    }

    let settings = builder
        // Layer 3: Environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Prefixed environment variables for nested overrides.
        .add_source(
            Environment::with_prefix("GLR")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    // An empty substitution like `api_key: "${OPENROUTER_API_KEY}"` means no key.
    if config
        .provider
        .api_key
        .as_deref()
        .is_some_and(|key| key.trim().is_empty())
    {
        config.provider.api_key = None;
    }
    if config.provider.api_key.is_none() {
        if let Ok(key) = env::var("OPENROUTER_API_KEY") {
            if !key.trim().is_empty() {
                config.provider.api_key = Some(key);
            }
        }
    }

    Ok(config)
}
