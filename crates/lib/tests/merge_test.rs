//! # Merge Policy Tests
//!
//! Covers how model output, regex fallback, the inference pass and the final
//! default combine into a mapping with a value for every placeholder.

mod common;

use common::{placeholders, setup_tracing, MockAiProvider};
use glr::{
    merge::{apply_fallback, fill_defaults, infer_missing},
    FieldMap, ValueSource,
};
use serde_json::json;

fn map(entries: &[(&str, &str)]) -> FieldMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_apply_fallback_prefers_non_empty_model_values() {
    let names = placeholders(&["A", "B", "C"]);
    let model = map(&[("A", "model-a"), ("B", ""), ("EXTRA", "x")]);
    let fallback = map(&[("A", "fb-a"), ("B", "fb-b"), ("C", "")]);

    let merged = apply_fallback(&names, &model, &fallback);

    assert_eq!(merged.mapping, map(&[("A", "model-a"), ("B", "fb-b"), ("C", "")]));
    assert_eq!(merged.sources["A"], ValueSource::Model);
    assert_eq!(merged.sources["B"], ValueSource::Fallback);
    assert_eq!(merged.still_empty(), vec!["C".to_string()]);
}

#[test]
fn test_blank_values_count_as_missing() {
    let names = placeholders(&["A", "B"]);
    let model = map(&[("A", "   "), ("B", "\t\n")]);
    let fallback = map(&[("A", "fb-a"), ("B", " ")]);

    let mut merged = apply_fallback(&names, &model, &fallback);

    assert_eq!(merged.mapping["A"], "fb-a");
    assert_eq!(merged.sources["A"], ValueSource::Fallback);
    assert_eq!(merged.still_empty(), vec!["B".to_string()]);

    fill_defaults(&mut merged, "N/A");
    assert_eq!(merged.mapping["B"], "N/A");
    assert_eq!(merged.sources["B"], ValueSource::Default);
}

#[tokio::test]
async fn test_infer_missing_only_touches_empty_fields() {
    setup_tracing();
    let names = placeholders(&["A", "B", "C"]);
    let mut merged = apply_fallback(&names, &map(&[("A", "kept")]), &FieldMap::new());
    let response = json!({"A": "overwrite?", "B": "inferred-b", "C": "", "ZZZ": "unknown"}).to_string();
    let provider = MockAiProvider::new(vec![&response]);

    infer_missing(&provider, &mut merged, "report text").await;

    assert_eq!(merged.mapping, map(&[("A", "kept"), ("B", "inferred-b"), ("C", "")]));
    assert_eq!(merged.sources["B"], ValueSource::Inference);
    assert!(!merged.mapping.contains_key("ZZZ"));

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].system_prompt.contains("NEVER output empty or N/A"));
    assert!(calls[0].user_prompt.starts_with("Fill these fields: [\"B\",\"C\"]"));
    assert_eq!(calls[0].options.max_tokens, 800);
}

#[tokio::test]
async fn test_infer_missing_skips_call_when_nothing_is_empty() {
    setup_tracing();
    let names = placeholders(&["A"]);
    let mut merged = apply_fallback(&names, &map(&[("A", "value")]), &FieldMap::new());
    let provider = MockAiProvider::new(vec![]);

    infer_missing(&provider, &mut merged, "text").await;

    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_infer_missing_swallows_failures() {
    setup_tracing();
    let names = placeholders(&["A"]);

    let failing = MockAiProvider::scripted(vec![Err("boom".to_string())]);
    let mut merged = apply_fallback(&names, &FieldMap::new(), &FieldMap::new());
    infer_missing(&failing, &mut merged, "text").await;
    assert_eq!(merged.mapping["A"], "");

    let garbage = MockAiProvider::new(vec!["[\"not\", \"an\", \"object\"]"]);
    infer_missing(&garbage, &mut merged, "text").await;
    assert_eq!(merged.mapping["A"], "");
    assert_eq!(merged.sources["A"], ValueSource::Fallback);
}

#[test]
fn test_fill_defaults_guarantees_non_empty_values() {
    let names = placeholders(&["A", "B"]);
    let mut merged = apply_fallback(&names, &map(&[("A", "a")]), &FieldMap::new());

    fill_defaults(&mut merged, "N/A");

    assert_eq!(merged.mapping, map(&[("A", "a"), ("B", "N/A")]));
    assert_eq!(merged.sources["B"], ValueSource::Default);
    assert!(merged.still_empty().is_empty());
}
