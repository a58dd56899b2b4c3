pub mod openrouter;

use crate::{errors::PromptError, types::GenerationOptions};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

pub use openrouter::OpenRouterProvider;

/// A trait for interacting with an AI provider.
///
/// This trait defines a common interface for sending a system and user prompt
/// to a chat model, so the extraction modes never depend on a concrete vendor.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// The result should be the raw text content of the model's reply.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);
