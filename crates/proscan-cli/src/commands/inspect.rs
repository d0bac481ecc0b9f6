//! Inspect command - show how a single document is read and classified.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;

use proscan_core::{DocumentOutcome, DocumentSource, Pipeline, SourceDocument, UNSET_DATE};

use super::config::load_config;
use crate::source::FileSource;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input file (.pdf, .eml, or .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// Write the extracted text of each document into this directory
    #[arg(long, value_name = "DIR")]
    save_text: Option<PathBuf>,

    /// Only read the first page of each PDF
    #[arg(long)]
    first_page_only: bool,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let mut config = load_config(config_path)?;
    if args.first_page_only {
        config.pdf.first_page_only = true;
    }
    let pipeline = Pipeline::from_config(&config)?;

    let mut source = FileSource::new(vec![args.input.display().to_string()]);
    let documents = source.documents()?;

    if documents.is_empty() {
        println!("{} No documents found in {}", style("ℹ").blue(), args.input.display());
        return Ok(());
    }

    if let Some(dir) = &args.save_text {
        fs::create_dir_all(dir)?;
    }

    for document in &documents {
        inspect_document(&pipeline, document, args.save_text.as_deref())?;
    }

    Ok(())
}

fn inspect_document(
    pipeline: &Pipeline,
    document: &SourceDocument,
    save_text: Option<&Path>,
) -> anyhow::Result<()> {
    println!("{}", style(&document.name).bold());

    let extracted = match pipeline.read_text(document) {
        Ok(extracted) => extracted,
        Err(e) => {
            println!("  {} {}", style("✗").red(), e);
            return Ok(());
        }
    };
    let text = extracted.text;
    let classifier = pipeline.classifier();

    println!("  Pages:   {}", extracted.pages);
    println!(
        "  Markers: {} x '{}' (threshold {})",
        classifier.count_markers(&text),
        classifier.marker(),
        classifier.threshold()
    );

    if let Some(dir) = save_text {
        let path = dir.join(format!("{}_extracted.txt", text_stem(&document.name)));
        fs::write(&path, &text)?;
        println!("  Text:    {}", path.display());
    }

    match pipeline.process_text(&text) {
        DocumentOutcome::Record(record) => {
            println!("  {} In scope", style("✓").green());
            println!("    PRO#:    {}", record.tracking_number());
            if record.invoice_date() == UNSET_DATE {
                println!("    Date:    {}", style("Not found").yellow());
            } else {
                println!("    Date:    {}", record.invoice_date());
            }
            println!("    Pieces:  {}", record.piece_count());
            println!("    Load ID: {}", record.load_id());

            let missing = record.missing_fields();
            if !missing.is_empty() {
                println!("    {} Missing: {}", style("⚠").yellow(), missing.join(", "));
            }
        }
        DocumentOutcome::Rejected { .. } => {
            println!("  {} Out of scope", style("ℹ").blue());
        }
        DocumentOutcome::IntegrityViolation(e) => {
            println!("  {} Check invoice: {}", style("⚠").yellow(), e);
        }
        DocumentOutcome::ExtractionFault(reason) => {
            println!("  {} {}", style("✗").red(), reason);
        }
    }

    Ok(())
}

/// File stem of the last path segment of a document name.
fn text_stem(name: &str) -> &str {
    let last = name.rsplit('/').next().unwrap_or(name);
    Path::new(last)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(last)
}
