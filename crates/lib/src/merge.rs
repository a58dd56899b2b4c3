//! # Result Merging
//!
//! Reconciles the model's mapping with the regex fallback, asks the model once
//! more for anything still missing, and finally writes the configured default
//! so that every placeholder leaves with a non-empty value.

use crate::{
    json_block::{parse_model_object, value_to_text},
    prompts::{inference_user_prompt, INFERENCE_MAX_TOKENS, INFERENCE_SYSTEM_PROMPT},
    providers::ai::AiProvider,
    types::{FieldMap, GenerationOptions, ValueSource},
};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// The merged mapping together with the origin of each value.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedFields {
    pub mapping: FieldMap,
    pub sources: BTreeMap<String, ValueSource>,
}

impl MergedFields {
    fn set(&mut self, placeholder: &str, value: String, source: ValueSource) {
        self.mapping.insert(placeholder.to_string(), value);
        self.sources.insert(placeholder.to_string(), source);
    }

    /// Placeholders whose value is still empty or blank, in sorted order.
    pub fn still_empty(&self) -> Vec<String> {
        self.mapping
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| k.clone())
            .collect()
    }
}

/// Layers model output over the fallback values, placeholder by placeholder.
///
/// The result contains exactly the given placeholders. A model value wins when it
/// is not blank; otherwise the fallback value is used, even if it is empty too.
pub fn apply_fallback(
    placeholders: &[String],
    model_mapping: &FieldMap,
    fallback: &FieldMap,
) -> MergedFields {
    let mut merged = MergedFields {
        mapping: FieldMap::new(),
        sources: BTreeMap::new(),
    };
    for placeholder in placeholders {
        match model_mapping.get(placeholder).filter(|v| !v.trim().is_empty()) {
            Some(value) => merged.set(placeholder, value.clone(), ValueSource::Model),
            None => {
                let value = fallback.get(placeholder).cloned().unwrap_or_default();
                merged.set(placeholder, value, ValueSource::Fallback);
            }
        }
    }
    merged
}

/// Asks the model to infer every still-empty field.
///
/// This pass is best effort: any failure is logged and leaves the fields empty.
/// Keys the model invents, or that already have a value, are ignored.
#[instrument(skip_all)]
pub async fn infer_missing(ai_provider: &dyn AiProvider, merged: &mut MergedFields, pdf_text: &str) {
    let still_empty = merged.still_empty();
    if still_empty.is_empty() {
        return;
    }
    info!(
        fields = still_empty.len(),
        "Running inference pass for empty fields."
    );

    let user_prompt = inference_user_prompt(&still_empty, pdf_text);
    let output = match ai_provider
        .generate(
            INFERENCE_SYSTEM_PROMPT,
            &user_prompt,
            GenerationOptions::new(0.0, INFERENCE_MAX_TOKENS),
        )
        .await
    {
        Ok(output) => output,
        Err(e) => {
            warn!("Inference pass failed, keeping empty fields: {e}");
            return;
        }
    };

    let inferred = match parse_model_object(&output) {
        Ok(inferred) => inferred,
        Err(e) => {
            warn!("Inference pass returned unusable output: {e}");
            return;
        }
    };

    for (key, value) in &inferred {
        if !still_empty.contains(key) {
            continue;
        }
        let value = value_to_text(value);
        if !value.trim().is_empty() {
            merged.set(key, value, ValueSource::Inference);
        }
    }
}

/// Writes `missing_value` into every field that is still empty.
pub fn fill_defaults(merged: &mut MergedFields, missing_value: &str) {
    for placeholder in merged.still_empty() {
        warn!(placeholder = %placeholder, "No value found; writing default.");
        merged.set(&placeholder, missing_value.to_string(), ValueSource::Default);
    }
}
