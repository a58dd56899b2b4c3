//! # CLI Command Tests
//!
//! Runs the `glr` binary against generated fixtures. None of these commands
//! reach a model.

use assert_cmd::prelude::*;
use glr_test_utils::helpers::{generate_test_pdf, DocxBuilder};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;

fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).expect("Failed to write fixture file");
    path
}

fn glr(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("glr").unwrap();
    cmd.current_dir(dir).env_remove("OPENROUTER_API_KEY");
    cmd
}

#[test]
fn test_placeholders_command_lists_tokens() {
    let temp_dir = tempdir().unwrap();
    let docx = DocxBuilder::new()
        .paragraph("Insured: [INSURED_NAME]")
        .split_paragraph(&["Claim [CLAIM_", "NUMBER]"])
        .footer("[DATE_RECEIVED]")
        .build()
        .unwrap();
    let template = write_fixture(temp_dir.path(), "glr.docx", &docx);

    glr(temp_dir.path())
        .arg("placeholders")
        .arg(&template)
        .assert()
        .success()
        .stdout("CLAIM_NUMBER\nDATE_RECEIVED\nINSURED_NAME\n");

    glr(temp_dir.path())
        .arg("placeholders")
        .arg(&template)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"INSURED_NAME\""));
}

#[test]
fn test_text_command_combines_reports_and_warns_about_scans() {
    let temp_dir = tempdir().unwrap();
    let first = write_fixture(
        temp_dir.path(),
        "a.pdf",
        &generate_test_pdf(&[&["Insured: Jane Roe"]]).unwrap(),
    );
    let scan = write_fixture(
        temp_dir.path(),
        "scan.pdf",
        &generate_test_pdf(&[&[]]).unwrap(),
    );
    let second = write_fixture(
        temp_dir.path(),
        "b.pdf",
        &generate_test_pdf(&[&["Policy P-0042"]]).unwrap(),
    );

    glr(temp_dir.path())
        .arg("text")
        .arg(&first)
        .arg(&scan)
        .arg(&second)
        .assert()
        .success()
        .stdout("Insured: Jane Roe\n\nPolicy P-0042\n")
        .stderr(predicate::str::contains("No text found in scan.pdf"));
}

#[test]
fn test_text_command_fails_without_any_text() {
    let temp_dir = tempdir().unwrap();
    let scan = write_fixture(
        temp_dir.path(),
        "scan.pdf",
        &generate_test_pdf(&[&[]]).unwrap(),
    );

    glr(temp_dir.path())
        .arg("text")
        .arg(&scan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Text failed"));
}

#[test]
fn test_fill_command_without_api_key_fails() {
    let temp_dir = tempdir().unwrap();
    let template = write_fixture(
        temp_dir.path(),
        "glr.docx",
        &DocxBuilder::new().paragraph("[INSURED_NAME]").build().unwrap(),
    );
    let pdf = write_fixture(
        temp_dir.path(),
        "a.pdf",
        &generate_test_pdf(&[&["Insured: Jane Roe"]]).unwrap(),
    );

    glr(temp_dir.path())
        .arg("fill")
        .arg("--template")
        .arg(&template)
        .arg("--pdf")
        .arg(&pdf)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fill failed").and(predicate::str::contains("API key is missing")));
}

#[test]
fn test_fill_command_rejects_unknown_mode() {
    let temp_dir = tempdir().unwrap();

    glr(temp_dir.path())
        .args(["fill", "--template", "t.docx", "--pdf", "a.pdf", "--mode", "guess"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown extraction mode: guess"));
}

#[test]
fn test_missing_template_file_is_reported() {
    let temp_dir = tempdir().unwrap();

    glr(temp_dir.path())
        .args(["placeholders", "missing.docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not read 'missing.docx'"));
}
