//! # Extraction Modes
//!
//! Each mode sends the placeholder list and the combined report text to the
//! model with a different prompt, then reconciles the answer so that every
//! placeholder has an entry. The modes differ in the auxiliary output they ask
//! for; voting additionally samples the model several times.

use crate::{
    errors::PromptError,
    json_block::{parse_model_object, string_map, value_to_text},
    prompts::{
        render_user_prompt, voting_system_prompt, FIELD_AUDIT_SYSTEM_PROMPT,
        FIELD_AUDIT_USER_PROMPT, HIGH_ACCURACY_SYSTEM_PROMPT, HIGH_ACCURACY_USER_PROMPT,
        SINGLE_PASS_MAX_TOKENS, STRICT_VALIDATION_SYSTEM_PROMPT, STRICT_VALIDATION_USER_PROMPT,
        VOTING_MAX_TOKENS, VOTING_TEMPERATURES, VOTING_USER_PROMPT,
    },
    providers::ai::AiProvider,
    types::{ExtractionMode, FieldMap, FieldStatus, GenerationOptions, ModeDetails, ModeOutput},
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Runs the given extraction mode.
pub async fn run_mode(
    ai_provider: &dyn AiProvider,
    mode: ExtractionMode,
    placeholders: &[String],
    pdf_text: &str,
    voting_rounds: usize,
) -> Result<ModeOutput, PromptError> {
    match mode {
        ExtractionMode::HighAccuracy => high_accuracy(ai_provider, placeholders, pdf_text).await,
        ExtractionMode::StrictValidation => {
            strict_validation(ai_provider, placeholders, pdf_text).await
        }
        ExtractionMode::FieldAudit => field_audit(ai_provider, placeholders, pdf_text).await,
        ExtractionMode::MultiLlmVoting => {
            voting(ai_provider, placeholders, pdf_text, voting_rounds).await
        }
    }
}

/// Sends one deterministic request and returns the parsed JSON object.
async fn single_pass(
    ai_provider: &dyn AiProvider,
    system_prompt: &str,
    user_template: &str,
    placeholders: &[String],
    pdf_text: &str,
) -> Result<Map<String, Value>, PromptError> {
    let user_prompt = render_user_prompt(user_template, placeholders, pdf_text);
    let output = ai_provider
        .generate(
            system_prompt,
            &user_prompt,
            GenerationOptions::new(0.0, SINGLE_PASS_MAX_TOKENS),
        )
        .await?;
    parse_model_object(&output)
}

/// Makes sure every placeholder has an entry, keeping whatever the model returned.
fn with_defaults<V: Clone>(
    mut map: BTreeMap<String, V>,
    placeholders: &[String],
    default: V,
) -> BTreeMap<String, V> {
    for placeholder in placeholders {
        map.entry(placeholder.clone())
            .or_insert_with(|| default.clone());
    }
    map
}

#[instrument(skip_all, fields(placeholders = placeholders.len()))]
pub async fn high_accuracy(
    ai_provider: &dyn AiProvider,
    placeholders: &[String],
    pdf_text: &str,
) -> Result<ModeOutput, PromptError> {
    let parsed = single_pass(
        ai_provider,
        HIGH_ACCURACY_SYSTEM_PROMPT,
        HIGH_ACCURACY_USER_PROMPT,
        placeholders,
        pdf_text,
    )
    .await?;

    let confidences: BTreeMap<String, f64> = parsed
        .get("confidences")
        .and_then(Value::as_object)
        .map(|inner| {
            inner
                .iter()
                .map(|(k, v)| (k.clone(), confidence_value(v)))
                .collect()
        })
        .unwrap_or_default();

    Ok(ModeOutput {
        mapping: with_defaults(string_map(&parsed, "mapping"), placeholders, String::new()),
        details: ModeDetails::HighAccuracy {
            confidences: with_defaults(confidences, placeholders, 0.0),
        },
    })
}

fn confidence_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[instrument(skip_all, fields(placeholders = placeholders.len()))]
pub async fn strict_validation(
    ai_provider: &dyn AiProvider,
    placeholders: &[String],
    pdf_text: &str,
) -> Result<ModeOutput, PromptError> {
    let parsed = single_pass(
        ai_provider,
        STRICT_VALIDATION_SYSTEM_PROMPT,
        STRICT_VALIDATION_USER_PROMPT,
        placeholders,
        pdf_text,
    )
    .await?;

    let status: BTreeMap<String, FieldStatus> = string_map(&parsed, "status")
        .into_iter()
        .map(|(k, v)| (k, FieldStatus::parse_lenient(&v)))
        .collect();

    Ok(ModeOutput {
        mapping: with_defaults(string_map(&parsed, "mapping"), placeholders, String::new()),
        details: ModeDetails::StrictValidation {
            status: with_defaults(status, placeholders, FieldStatus::Missing),
            reasons: with_defaults(string_map(&parsed, "reasons"), placeholders, String::new()),
        },
    })
}

#[instrument(skip_all, fields(placeholders = placeholders.len()))]
pub async fn field_audit(
    ai_provider: &dyn AiProvider,
    placeholders: &[String],
    pdf_text: &str,
) -> Result<ModeOutput, PromptError> {
    let parsed = single_pass(
        ai_provider,
        FIELD_AUDIT_SYSTEM_PROMPT,
        FIELD_AUDIT_USER_PROMPT,
        placeholders,
        pdf_text,
    )
    .await?;

    Ok(ModeOutput {
        mapping: with_defaults(
            string_map(&parsed, "field_values"),
            placeholders,
            String::new(),
        ),
        details: ModeDetails::FieldAudit {
            evidence: with_defaults(string_map(&parsed, "evidence"), placeholders, String::new()),
        },
    })
}

/// Samples the model at increasing temperatures and keeps the most frequent answer per field.
///
/// Rounds whose output is not a JSON object are skipped; provider errors abort the run.
#[instrument(skip_all, fields(placeholders = placeholders.len(), rounds = rounds))]
pub async fn voting(
    ai_provider: &dyn AiProvider,
    placeholders: &[String],
    pdf_text: &str,
    rounds: usize,
) -> Result<ModeOutput, PromptError> {
    let user_prompt = render_user_prompt(VOTING_USER_PROMPT, placeholders, pdf_text);
    let mut candidates: BTreeMap<String, Vec<String>> = placeholders
        .iter()
        .map(|p| (p.clone(), Vec::new()))
        .collect();

    let rounds = rounds.clamp(1, VOTING_TEMPERATURES.len());
    for &temperature in &VOTING_TEMPERATURES[..rounds] {
        info!(temperature, "Running voting round.");
        let output = ai_provider
            .generate(
                &voting_system_prompt(temperature),
                &user_prompt,
                GenerationOptions::new(temperature, VOTING_MAX_TOKENS),
            )
            .await?;

        let parsed = match parse_model_object(&output) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(temperature, "Skipping voting round with unusable output: {e}");
                continue;
            }
        };
        let answers = ballot(parsed);

        for placeholder in placeholders {
            let Some(value) = answers.get(placeholder) else {
                continue;
            };
            let value = value_to_text(value);
            let value = value.trim();
            if !value.is_empty() {
                if let Some(list) = candidates.get_mut(placeholder) {
                    list.push(value.to_string());
                }
            }
        }
    }

    let mut mapping = FieldMap::new();
    let mut votes = BTreeMap::new();
    for (placeholder, values) in &candidates {
        let (winner, tally) = tally_votes(values);
        mapping.insert(placeholder.clone(), winner);
        votes.insert(placeholder.clone(), tally);
    }

    Ok(ModeOutput {
        mapping,
        details: ModeDetails::MultiLlmVoting { votes, candidates },
    })
}

/// A round's answers, unwrapping a nested `mapping` object when the model adds one.
fn ballot(mut parsed: Map<String, Value>) -> Map<String, Value> {
    match parsed.remove("mapping") {
        Some(Value::Object(inner)) => inner,
        Some(other) => {
            parsed.insert("mapping".to_string(), other);
            parsed
        }
        None => parsed,
    }
}

/// Counts votes and picks the most frequent value; ties go to the value seen first.
fn tally_votes(values: &[String]) -> (String, BTreeMap<String, usize>) {
    let mut order: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match order.iter_mut().find(|(seen, _)| *seen == value.as_str()) {
            Some((_, count)) => *count += 1,
            None => order.push((value.as_str(), 1)),
        }
    }

    let mut winner: Option<(&str, usize)> = None;
    for &(value, count) in &order {
        if winner.map_or(true, |(_, best)| count > best) {
            winner = Some((value, count));
        }
    }

    let tally = order
        .iter()
        .map(|(value, count)| (value.to_string(), *count))
        .collect();
    (
        winner.map(|(value, _)| value.to_string()).unwrap_or_default(),
        tally,
    )
}
