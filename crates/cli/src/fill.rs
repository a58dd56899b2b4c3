use crate::{read_input, text::combine_files};
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use glr::providers::ai::{AiProvider, OpenRouterProvider};
use glr::types::{DEFAULT_API_URL, DEFAULT_MISSING_VALUE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use glr::{run_extraction, ExtractionMode, ExtractionReport, ExtractionSettings, ProviderConfig};
use glr_docx::{output_file_name, DocxTemplate};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug, Clone)]
pub struct FillArgs {
    /// The .docx template whose [PLACEHOLDERS] are filled
    #[arg(long, required = true)]
    pub template: PathBuf,
    /// A report PDF; repeat for several reports
    #[arg(long = "pdf", required = true, num_args = 1..)]
    pub pdfs: Vec<PathBuf>,
    /// Extraction mode: high_accuracy, strict_validation, field_audit or multi_llm_voting
    #[arg(long, default_value = "high_accuracy")]
    pub mode: ExtractionMode,
    /// Where to write the filled document (default: filled_glr_<timestamp>.docx)
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Also write the extraction report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
    /// Value written for fields nothing could fill
    #[arg(long, default_value = DEFAULT_MISSING_VALUE)]
    pub missing_value: String,
    /// Number of voting rounds for multi_llm_voting (1 to 3)
    #[arg(long, default_value_t = 3)]
    pub voting_rounds: usize,
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long, env = "GLR_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    #[arg(long, env = "GLR_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl FillArgs {
    fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            model_name: self.model.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    fn settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            voting_rounds: self.voting_rounds,
            missing_value: self.missing_value.clone(),
        }
    }
}

/// What a `fill` run wrote.
#[derive(Debug)]
pub struct FillOutcome {
    pub output: PathBuf,
    pub report: ExtractionReport,
}

pub async fn handle_fill(args: &FillArgs) -> Result<()> {
    let provider = OpenRouterProvider::new(&args.provider_config())?;
    let outcome = fill_with_provider(args, &provider).await?;

    println!("✅ Extraction complete!");
    println!("{}", serde_json::to_string_pretty(&outcome.report.mapping)?);
    println!("📄 Wrote '{}'.", outcome.output.display());
    Ok(())
}

/// Runs the whole pipeline for `args` against `ai_provider` and writes the outputs.
pub async fn fill_with_provider(
    args: &FillArgs,
    ai_provider: &dyn AiProvider,
) -> Result<FillOutcome> {
    let template = DocxTemplate::from_bytes(read_input(&args.template)?)
        .with_context(|| format!("'{}' is not a usable template", args.template.display()))?;
    let placeholders = template.placeholders()?;
    info!("Detected placeholders: {:?}", placeholders);

    let combined = combine_files(&args.pdfs)?;

    let report = run_extraction(
        ai_provider,
        args.mode,
        &placeholders,
        &combined.text,
        &args.settings(),
        Local::now().date_naive(),
    )
    .await?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(output_file_name(Local::now().naive_local())));
    std::fs::write(&output, template.fill(&report.mapping)?)
        .with_context(|| format!("Could not write '{}'", output.display()))?;
    info!("Wrote filled document to '{}'.", output.display());

    if let Some(report_path) = &args.report {
        std::fs::write(report_path, serde_json::to_vec_pretty(&report)?)
            .with_context(|| format!("Could not write '{}'", report_path.display()))?;
    }

    Ok(FillOutcome { output, report })
}
