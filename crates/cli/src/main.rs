//! # glr: the GLR command-line interface
//!
//! Inspect templates, dump report text, and fill templates from reports.

use anyhow::Result;
use clap::{Parser, Subcommand};
use glr_cli::{
    fill::{handle_fill, FillArgs},
    placeholders::{handle_placeholders, PlaceholdersArgs},
    text::{handle_text, TextArgs},
};
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the [PLACEHOLDERS] of a .docx template
    Placeholders(PlaceholdersArgs),
    /// Print the combined text of one or more report PDFs
    Text(TextArgs),
    /// Extract field values from report PDFs and fill a template
    Fill(FillArgs),
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays pipeable.
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let (name, result) = match &cli.command {
        Commands::Placeholders(args) => ("Placeholders", handle_placeholders(args)),
        Commands::Text(args) => ("Text", handle_text(args)),
        Commands::Fill(args) => ("Fill", handle_fill(args).await),
    };

    if let Err(e) = result {
        eprintln!("{name} failed: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
