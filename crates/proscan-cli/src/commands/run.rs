//! Run command - scan a batch of documents and write the invoice report.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use tracing::{debug, info, warn};

use proscan_core::{BatchOutput, DiagnosticKind, Pipeline, ProscanConfig};

use super::config::load_config;
use crate::report::{create_sink, OutputFormat};
use crate::source::FileSource;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Input files, directories, or glob patterns (.pdf, .eml, .txt)
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Only read the first page of each PDF
    #[arg(long)]
    first_page_only: bool,

    /// Marker phrase that identifies in-scope invoices
    #[arg(long)]
    marker: Option<String>,

    /// Minimum number of marker occurrences
    #[arg(long)]
    threshold: Option<usize>,

    /// chrono format for the date column
    #[arg(long)]
    date_format: Option<String>,

    /// Abort the batch after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl RunArgs {
    fn apply(&self, config: &mut ProscanConfig) {
        if let Some(marker) = &self.marker {
            config.classifier.marker = marker.clone();
        }
        if let Some(threshold) = self.threshold {
            config.classifier.threshold = threshold;
        }
        if let Some(date_format) = &self.date_format {
            config.report.date_format = date_format.clone();
        }
        if self.first_page_only {
            config.pdf.first_page_only = true;
        }
    }
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.apply(&mut config);
    let cancel = Arc::new(AtomicBool::new(false));
    let pipeline = Pipeline::from_config(&config)?.with_cancel_flag(cancel.clone());

    let inputs = args.inputs.clone();
    let format = args.format;
    let date_format = config.report.date_format.clone();

    let task = tokio::task::spawn_blocking(move || -> proscan_core::Result<(BatchOutput, Vec<u8>)> {
        let mut source = FileSource::new(inputs);
        let mut buffer = Vec::new();
        let output = {
            let mut sink = create_sink(format, Box::new(&mut buffer), &date_format);
            pipeline.run_batch(&mut source, sink.as_mut())?
        };
        Ok((output, buffer))
    });

    let joined = match args.timeout {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), task).await {
            Ok(joined) => joined,
            Err(_) => {
                // The worker stops at the next document; main does not wait for it
                cancel.store(true, Ordering::Relaxed);
                warn!("Batch timed out after {} seconds", secs);
                anyhow::bail!("Batch did not finish within {} seconds", secs);
            }
        },
        None => task.await,
    };
    let (output, report) = joined??;

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &report)?;
            debug!("Wrote report to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&report)?;
            stdout.flush()?;
        }
    }

    print_diagnostics(&output);

    eprintln!();
    eprintln!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        output.processed,
        start.elapsed()
    );
    eprintln!(
        "   {} records, {} skipped, {} dropped",
        style(output.records.len()).green(),
        style(output.skipped()).yellow(),
        style(output.dropped()).red()
    );

    if let Some(path) = &args.output {
        eprintln!(
            "{} Report written to {}",
            style("✓").green(),
            path.display()
        );
    }

    info!("Batch complete");
    Ok(())
}

fn print_diagnostics(output: &BatchOutput) {
    for diagnostic in &output.diagnostics {
        let marker = match diagnostic.kind {
            DiagnosticKind::Skipped => style("ℹ").blue(),
            DiagnosticKind::IntegrityViolation => style("⚠").yellow(),
            DiagnosticKind::ExtractionFault => style("✗").red(),
        };
        eprintln!("{} {}", marker, diagnostic);
    }
}
