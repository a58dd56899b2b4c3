use chrono::Local;
use dotenvy::dotenv;
use glr::{
    providers::ai::OpenRouterProvider, run_extraction, ExtractionMode, ExtractionSettings,
    ProviderConfig,
};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging and load .env file
    tracing_subscriber::fmt::init();
    dotenv().ok();

    // --- Command-line argument parsing ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <report.txt> <mode> <PLACEHOLDER>...", args[0]);
        eprintln!();
        eprintln!(
            "Example: {} report.txt high_accuracy INSURED_NAME DATE_INSPECTED MORTGAGEE",
            args[0]
        );
        return Ok(());
    }

    let text = std::fs::read_to_string(&args[1])?;
    let mode: ExtractionMode = args[2].parse()?;
    let placeholders: Vec<String> = args[3..].to_vec();

    // --- Configuration from environment variables ---
    let mut config = ProviderConfig {
        api_key: env::var("OPENROUTER_API_KEY").ok(),
        ..Default::default()
    };
    if let Ok(model) = env::var("GLR_MODEL") {
        config.model_name = model;
    }
    let provider = OpenRouterProvider::new(&config)?;

    // --- Run Extraction ---
    let report = run_extraction(
        &provider,
        mode,
        &placeholders,
        &text,
        &ExtractionSettings::default(),
        Local::now().date_naive(),
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
