use crate::read_input;
use anyhow::Result;
use clap::Parser;
use glr_docx::find_placeholders;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
pub struct PlaceholdersArgs {
    /// The .docx template to inspect
    #[arg(required = true)]
    pub template: PathBuf,
    /// Print the list as a JSON array
    #[arg(long)]
    pub json: bool,
}

pub fn handle_placeholders(args: &PlaceholdersArgs) -> Result<()> {
    let placeholders = find_placeholders(&read_input(&args.template)?)?;
    info!(
        "Found {} placeholders in '{}'.",
        placeholders.len(),
        args.template.display()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&placeholders)?);
    } else {
        for name in &placeholders {
            println!("{name}");
        }
    }
    Ok(())
}
