//! # Extraction Pipeline
//!
//! Ties the pieces together: regex fallback, the chosen extraction mode, the
//! fallback merge, the inference pass and the final defaults.

use crate::{
    errors::PromptError,
    fallback::FallbackExtractor,
    merge::{apply_fallback, fill_defaults, infer_missing},
    modes::run_mode,
    providers::ai::AiProvider,
    types::{ExtractionMode, ExtractionReport, ExtractionSettings, DEFAULT_MISSING_VALUE},
};
use chrono::NaiveDate;
use tracing::{info, instrument};

/// Runs a full extraction for `placeholders` over the combined report text.
///
/// Errors from the chosen mode propagate; the inference pass never fails the run.
#[instrument(skip_all, fields(mode = %mode, placeholders = placeholders.len(), text_len = pdf_text.len()))]
pub async fn run_extraction(
    ai_provider: &dyn AiProvider,
    mode: ExtractionMode,
    placeholders: &[String],
    pdf_text: &str,
    settings: &ExtractionSettings,
    today: NaiveDate,
) -> Result<ExtractionReport, PromptError> {
    let fallback = FallbackExtractor::new()?.extract(pdf_text, placeholders, today);

    let output = run_mode(
        ai_provider,
        mode,
        placeholders,
        pdf_text,
        settings.voting_rounds,
    )
    .await?;

    let mut merged = apply_fallback(placeholders, &output.mapping, &fallback);
    infer_missing(ai_provider, &mut merged, pdf_text).await;

    let missing_value = if settings.missing_value.trim().is_empty() {
        DEFAULT_MISSING_VALUE
    } else {
        settings.missing_value.as_str()
    };
    fill_defaults(&mut merged, missing_value);

    info!("Extraction complete.");
    Ok(ExtractionReport {
        mode,
        mapping: merged.mapping,
        sources: merged.sources,
        details: output.details,
    })
}
