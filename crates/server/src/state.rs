//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the configuration and the
//! instantiated AI provider client, making them accessible to all request handlers.

use crate::config::AppConfig;
use glr::providers::ai::{AiProvider, OpenRouterProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<AppConfig>,
    /// The chat-completions provider used by every extraction mode.
    pub ai_provider: Arc<dyn AiProvider>,
}

/// Builds the shared application state from the configuration.
///
/// A missing API key is not fatal here: placeholder detection and text
/// extraction still work, and extraction requests report the problem.
pub fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let provider = OpenRouterProvider::new(&config.provider)?;
    if config.provider.api_key.is_none() {
        warn!("No API key configured; extraction requests will fail until OPENROUTER_API_KEY is set.");
    }
    info!(
        api_url = %config.provider.api_url,
        model = %provider.model(),
        "Initialized AI provider."
    );

    Ok(AppState {
        config: Arc::new(config),
        ai_provider: Arc::new(provider),
    })
}
