use thiserror::Error;

/// Custom error types for the extraction library.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("API key is missing. Set OPENROUTER_API_KEY or provider.api_key.")]
    MissingApiKey,
    #[error("Failed to parse model output as JSON: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Model output has an unexpected shape: {0}")]
    UnexpectedOutput(String),
    #[error("Unknown extraction mode: {0}")]
    UnknownMode(String),
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}
