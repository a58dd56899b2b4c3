//! # Prompt Template Modules
//!
//! This module organizes all prompt templates used by the extraction modes.
//! System prompts are plain constants; user prompts are templates with
//! `{placeholders}` and `{pdf_text}` slots filled by [`render_user_prompt`].

pub mod extraction;

pub use extraction::*;

/// Fills a user prompt template with the pretty-printed placeholder list and the report text.
pub fn render_user_prompt(template: &str, placeholders: &[String], pdf_text: &str) -> String {
    let placeholders_json =
        serde_json::to_string_pretty(placeholders).unwrap_or_else(|_| "[]".to_string());
    // The text goes in last so a literal `{placeholders}` inside a report stays untouched.
    template
        .replace("{placeholders}", &placeholders_json)
        .replace("{pdf_text}", pdf_text)
}

/// Builds the system prompt for one voting round at the given temperature.
pub fn voting_system_prompt(temperature: f32) -> String {
    VOTING_SYSTEM_PROMPT.replace("{temperature}", &format_temperature(temperature))
}

/// Builds the user prompt for the no-missing-data inference pass.
pub fn inference_user_prompt(still_empty: &[String], pdf_text: &str) -> String {
    let fields = serde_json::to_string(still_empty).unwrap_or_else(|_| "[]".to_string());
    INFERENCE_USER_PROMPT
        .replace("{fields}", &fields)
        .replace("{pdf_text}", pdf_text)
}

fn format_temperature(temperature: f32) -> String {
    if temperature.fract() == 0.0 {
        format!("{temperature:.1}")
    } else {
        format!("{temperature}")
    }
}
