//! # GLR Field Extraction
//!
//! This crate turns the raw text of insurance inspection reports into values for
//! the placeholders of a GLR template. It wraps a chat-completion model behind
//! the [`AiProvider`](providers::ai::AiProvider) trait, offers four prompting
//! strategies, and merges their output with regex fallbacks so that every
//! placeholder ends up filled.

pub mod errors;
pub mod fallback;
pub mod json_block;
pub mod merge;
pub mod modes;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod types;

pub use errors::PromptError;
pub use pipeline::run_extraction;
pub use types::{
    ExtractionMode, ExtractionReport, ExtractionSettings, FieldMap, GenerationOptions,
    ModeDetails, ProviderConfig, ValueSource,
};
