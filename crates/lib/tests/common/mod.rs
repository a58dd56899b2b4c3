#![allow(dead_code)]
//! # Common Test Utilities
//!
//! This module provides shared utilities for testing, such as a scripted AI
//! provider, to keep the extraction tests isolated and repeatable.

use async_trait::async_trait;
use dotenvy::dotenv;
use glr::{providers::ai::AiProvider, GenerationOptions, PromptError};
use std::fmt::Debug;
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();
    });
}

/// One recorded call to the mock provider.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub system_prompt: String,
    pub user_prompt: String,
    pub options: GenerationOptions,
}

// --- Mock AI Provider for Logic Testing ---

/// Replays scripted responses in order and records every call.
///
/// `Err` entries are returned as `PromptError::AiApi`. Once the script runs out,
/// every further call fails.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<RecordedCall>>>,
    responses: Arc<RwLock<Vec<Result<String, String>>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<&str>) -> Self {
        Self::scripted(responses.into_iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn scripted(responses: Vec<Result<String, String>>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.call_history.read().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, PromptError> {
        self.call_history.write().unwrap().push(RecordedCall {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            options,
        });

        match self.responses.write().unwrap().pop() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(PromptError::AiApi(message)),
            None => Err(PromptError::AiApi(
                "MockAiProvider: no more scripted responses".to_string(),
            )),
        }
    }
}

pub fn placeholders(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
