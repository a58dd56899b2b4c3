use crate::{
    errors::PromptError,
    providers::ai::AiProvider,
    types::{GenerationOptions, ProviderConfig},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatMessage,
}

// --- Provider implementation ---

/// A provider for OpenRouter or any other OpenAI-compatible chat-completions API.
#[derive(Clone)]
pub struct OpenRouterProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl Debug for OpenRouterProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterProvider")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl OpenRouterProvider {
    /// Creates a new `OpenRouterProvider`.
    ///
    /// A missing key is accepted here and reported on the first call, so the
    /// rest of the pipeline can run without one.
    pub fn new(config: &ProviderConfig) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone().filter(|key| !key.trim().is_empty()),
            model: config.model_name.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AiProvider for OpenRouterProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, PromptError> {
        let api_key = self.api_key.as_deref().ok_or(PromptError::MissingApiKey)?;

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        debug!(
            model = %self.model,
            temperature = options.temperature,
            max_tokens = options.max_tokens,
            "Sending chat completion request."
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(format!("{status}: {error_text}")));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| PromptError::UnexpectedOutput("response had no choices".to_string()))
    }
}
