use crate::errors::PromptError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A flat mapping of placeholder name to its value.
pub type FieldMap = BTreeMap<String, String>;

/// The default OpenRouter chat-completions endpoint.
pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
/// The default model used for every extraction call.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// The default request timeout for a single model call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// The value written for placeholders nothing could fill.
pub const DEFAULT_MISSING_VALUE: &str = "N/A";

/// The prompting strategy used to extract field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    #[default]
    HighAccuracy,
    StrictValidation,
    FieldAudit,
    MultiLlmVoting,
}

impl ExtractionMode {
    pub const ALL: [ExtractionMode; 4] = [
        ExtractionMode::HighAccuracy,
        ExtractionMode::StrictValidation,
        ExtractionMode::FieldAudit,
        ExtractionMode::MultiLlmVoting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::HighAccuracy => "high_accuracy",
            ExtractionMode::StrictValidation => "strict_validation",
            ExtractionMode::FieldAudit => "field_audit",
            ExtractionMode::MultiLlmVoting => "multi_llm_voting",
        }
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ExtractionMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| PromptError::UnknownMode(s.to_string()))
    }
}

/// Sampling options for a single model call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationOptions {
    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self::new(0.0, 1200)
    }
}

/// Connection settings for a chat-completions provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_model_name() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model_name: default_model_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Tunables for one extraction run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionSettings {
    /// How many voting rounds to run, at most one per known temperature.
    #[serde(default = "default_voting_rounds")]
    pub voting_rounds: usize,
    /// Written for placeholders that are still empty after every other source.
    #[serde(default = "default_missing_value")]
    pub missing_value: String,
}

fn default_voting_rounds() -> usize {
    3
}

fn default_missing_value() -> String {
    DEFAULT_MISSING_VALUE.to_string()
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            voting_rounds: default_voting_rounds(),
            missing_value: default_missing_value(),
        }
    }
}

/// Where the final value of a placeholder came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Model,
    Fallback,
    Inference,
    Default,
}

/// Per-field verdict produced by the strict validation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldStatus {
    Verified,
    Inferred,
    Missing,
}

impl FieldStatus {
    /// Parses a model-supplied status, treating anything unrecognised as missing.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "VERIFIED" => FieldStatus::Verified,
            "INFERRED" => FieldStatus::Inferred,
            _ => FieldStatus::Missing,
        }
    }
}

/// The auxiliary output of each extraction mode, next to the mapping itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeDetails {
    HighAccuracy {
        confidences: BTreeMap<String, f64>,
    },
    StrictValidation {
        status: BTreeMap<String, FieldStatus>,
        reasons: FieldMap,
    },
    FieldAudit {
        evidence: FieldMap,
    },
    MultiLlmVoting {
        votes: BTreeMap<String, BTreeMap<String, usize>>,
        candidates: BTreeMap<String, Vec<String>>,
    },
}

/// What a single extraction mode returns before merging.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeOutput {
    /// Values as returned by the model, one entry per placeholder.
    pub mapping: FieldMap,
    pub details: ModeDetails,
}

/// The complete result of an extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub mode: ExtractionMode,
    /// Final, non-empty value for every placeholder.
    pub mapping: FieldMap,
    pub sources: BTreeMap<String, ValueSource>,
    pub details: ModeDetails,
}
