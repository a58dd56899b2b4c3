//! # Extraction Mode Tests
//!
//! Each mode is driven with scripted model output to check how it reconciles
//! partial, wrapped or malformed answers.

mod common;

use common::{placeholders, setup_tracing, MockAiProvider};
use glr::{
    modes::{field_audit, high_accuracy, run_mode, strict_validation, voting},
    types::FieldStatus,
    ExtractionMode, ModeDetails, PromptError,
};
use serde_json::json;

#[tokio::test]
async fn test_high_accuracy_fills_missing_entries() {
    setup_tracing();
    let response = format!(
        "Sure! Here is the result:\n```json\n{}\n```",
        json!({
            "mapping": {"INSURED_NAME": "Jane Roe", "EXTRA": "ignored later"},
            "confidences": {"INSURED_NAME": 0.92}
        })
    );
    let provider = MockAiProvider::new(vec![&response]);
    let names = placeholders(&["INSURED_NAME", "MORTGAGEE"]);

    let output = high_accuracy(&provider, &names, "Insured: Jane Roe").await.unwrap();

    assert_eq!(output.mapping["INSURED_NAME"], "Jane Roe");
    assert_eq!(output.mapping["MORTGAGEE"], "");
    let ModeDetails::HighAccuracy { confidences } = output.details else {
        panic!("wrong details variant");
    };
    assert_eq!(confidences["INSURED_NAME"], 0.92);
    assert_eq!(confidences["MORTGAGEE"], 0.0);

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].system_prompt.contains("expert insurance GLR extractor"));
    assert!(calls[0].user_prompt.contains("\"MORTGAGEE\""));
    assert!(calls[0].user_prompt.contains("----BEGIN----\nInsured: Jane Roe\n----END----"));
    assert_eq!(calls[0].options.temperature, 0.0);
    assert_eq!(calls[0].options.max_tokens, 1500);
}

#[tokio::test]
async fn test_high_accuracy_rejects_unparseable_output() {
    setup_tracing();
    let provider = MockAiProvider::new(vec!["I could not find anything."]);
    let names = placeholders(&["INSURED_NAME"]);

    let err = high_accuracy(&provider, &names, "text").await.unwrap_err();
    assert!(matches!(err, PromptError::JsonParse(_)));
}

#[tokio::test]
async fn test_strict_validation_defaults_status_to_missing() {
    setup_tracing();
    let response = json!({
        "mapping": {"INSURED_NAME": "Jane Roe", "DATE_INSPECTED": "03/14/2024"},
        "status": {"INSURED_NAME": "VERIFIED", "DATE_INSPECTED": "inferred"},
        "reasons": {"INSURED_NAME": "Stated on page 1."}
    })
    .to_string();
    let provider = MockAiProvider::new(vec![&response]);
    let names = placeholders(&["DATE_INSPECTED", "INSURED_NAME", "MORTGAGEE"]);

    let output = strict_validation(&provider, &names, "text").await.unwrap();

    assert_eq!(output.mapping["MORTGAGEE"], "");
    let ModeDetails::StrictValidation { status, reasons } = output.details else {
        panic!("wrong details variant");
    };
    assert_eq!(status["INSURED_NAME"], FieldStatus::Verified);
    assert_eq!(status["DATE_INSPECTED"], FieldStatus::Inferred);
    assert_eq!(status["MORTGAGEE"], FieldStatus::Missing);
    assert_eq!(reasons["INSURED_NAME"], "Stated on page 1.");
    assert_eq!(reasons["MORTGAGEE"], "");
}

#[tokio::test]
async fn test_field_audit_uses_field_values_as_mapping() {
    setup_tracing();
    let response = json!({
        "field_values": {"CLAIM_NUMBER": 48213},
        "evidence": {"CLAIM_NUMBER": "Header shows claim 48213."}
    })
    .to_string();
    let provider = MockAiProvider::new(vec![&response]);
    let names = placeholders(&["CLAIM_NUMBER", "INSURED_NAME"]);

    let output = field_audit(&provider, &names, "text").await.unwrap();

    assert_eq!(output.mapping["CLAIM_NUMBER"], "48213");
    assert_eq!(output.mapping["INSURED_NAME"], "");
    let ModeDetails::FieldAudit { evidence } = output.details else {
        panic!("wrong details variant");
    };
    assert_eq!(evidence["CLAIM_NUMBER"], "Header shows claim 48213.");
    assert_eq!(evidence["INSURED_NAME"], "");
}

#[tokio::test]
async fn test_voting_majority_and_skipped_round() {
    setup_tracing();
    let round_one = json!({"INSURED_NAME": " Jane Roe ", "MORTGAGEE": "Acme Bank"}).to_string();
    let round_two = "not json at all";
    let round_three = json!({"INSURED_NAME": "Jane Roe", "MORTGAGEE": ""}).to_string();
    let provider = MockAiProvider::new(vec![&round_one, round_two, &round_three]);
    let names = placeholders(&["INSURED_NAME", "MORTGAGEE", "POLICY_NUMBER"]);

    let output = voting(&provider, &names, "text", 3).await.unwrap();

    assert_eq!(output.mapping["INSURED_NAME"], "Jane Roe");
    assert_eq!(output.mapping["MORTGAGEE"], "Acme Bank");
    assert_eq!(output.mapping["POLICY_NUMBER"], "");

    let ModeDetails::MultiLlmVoting { votes, candidates } = output.details else {
        panic!("wrong details variant");
    };
    assert_eq!(votes["INSURED_NAME"]["Jane Roe"], 2);
    assert_eq!(candidates["MORTGAGEE"], vec!["Acme Bank".to_string()]);
    assert!(candidates["POLICY_NUMBER"].is_empty());
    assert!(votes["POLICY_NUMBER"].is_empty());

    let calls = provider.calls();
    let temperatures: Vec<f32> = calls.iter().map(|c| c.options.temperature).collect();
    assert_eq!(temperatures, vec![0.0, 0.2, 0.6]);
    assert!(calls[1].system_prompt.contains("temp=0.2"));
    assert!(calls.iter().all(|c| c.options.max_tokens == 1200));
}

#[tokio::test]
async fn test_voting_reads_nested_mapping_and_limits_rounds() {
    setup_tracing();
    let round = json!({"mapping": {"INSURED_NAME": "Jane Roe"}}).to_string();
    let provider = MockAiProvider::new(vec![&round]);
    let names = placeholders(&["INSURED_NAME"]);

    let output = voting(&provider, &names, "text", 1).await.unwrap();

    assert_eq!(output.mapping["INSURED_NAME"], "Jane Roe");
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn test_voting_rounds_are_clamped() {
    setup_tracing();
    let round = json!({"INSURED_NAME": "Jane Roe"}).to_string();
    let names = placeholders(&["INSURED_NAME"]);

    let provider = MockAiProvider::new(vec![&round, &round, &round]);
    voting(&provider, &names, "text", 0).await.unwrap();
    assert_eq!(provider.calls().len(), 1);

    let provider = MockAiProvider::new(vec![&round, &round, &round, &round]);
    let output = voting(&provider, &names, "text", 9).await.unwrap();
    let temperatures: Vec<f32> = provider.calls().iter().map(|c| c.options.temperature).collect();
    assert_eq!(temperatures, vec![0.0, 0.2, 0.6]);
    assert_eq!(output.mapping["INSURED_NAME"], "Jane Roe");
}

#[tokio::test]
async fn test_voting_propagates_provider_errors() {
    setup_tracing();
    let provider = MockAiProvider::scripted(vec![
        Ok("{}".to_string()),
        Err("rate limited".to_string()),
    ]);
    let names = placeholders(&["INSURED_NAME"]);

    let err = voting(&provider, &names, "text", 3).await.unwrap_err();
    assert!(matches!(err, PromptError::AiApi(ref m) if m == "rate limited"));
}

#[tokio::test]
async fn test_run_mode_dispatches() {
    setup_tracing();
    let response = json!({"field_values": {"A": "1"}, "evidence": {}}).to_string();
    let provider = MockAiProvider::new(vec![&response]);

    let output = run_mode(
        &provider,
        ExtractionMode::FieldAudit,
        &placeholders(&["A"]),
        "text",
        3,
    )
    .await
    .unwrap();

    assert!(matches!(output.details, ModeDetails::FieldAudit { .. }));
    assert!(provider.calls()[0]
        .system_prompt
        .contains("1–2 sentence evidence"));
}
