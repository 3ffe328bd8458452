//! Split command - split a single composite PDF.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invsplit_core::models::config::SplitConfig;
use invsplit_core::{DocumentReport, InvoiceSplitter};

/// Arguments for the split command.
#[derive(Args)]
pub struct SplitArgs {
    /// Composite PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Existing directory receiving the last pages
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: SplitArgs, config: &SplitConfig) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !args.output_dir.is_dir() {
        anyhow::bail!("Output directory not found: {}", args.output_dir.display());
    }

    info!("Splitting file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Splitting {}...", args.input.display()));

    let splitter = InvoiceSplitter::from_config(config);
    let report = splitter.split_file(&args.input, &args.output_dir);

    pb.finish_and_clear();
    let report = report?;

    println!("{}", format_report(&report, args.format)?);

    if !report.is_complete() {
        anyhow::bail!(
            "{} of {} invoice pages could not be written",
            report.failures.len(),
            report.segments.len()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_report(report: &DocumentReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_text(report: &DocumentReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Source: {}\n", report.source.display()));
    output.push_str(&format!("Pages: {}\n", report.page_count));
    output.push_str(&format!("Invoices: {}\n", report.segments.len()));
    output.push('\n');

    for record in &report.exported {
        let segment = &record.segment;
        output.push_str(&format!(
            "  {} {:03} {:<14} pages {}-{} -> {}\n",
            style("✓").green(),
            segment.discovery_order,
            segment.identifier,
            segment.first_page + 1,
            segment.last_page + 1,
            record
                .output_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));
    }

    for failure in &report.failures {
        output.push_str(&format!(
            "  {} {:03} {:<14} {}\n",
            style("✗").red(),
            failure.segment.discovery_order,
            failure.segment.identifier,
            failure.reason
        ));
    }

    let reappeared: Vec<String> = report
        .segments
        .iter()
        .filter(|s| s.reappeared)
        .map(|s| s.identifier.to_string())
        .collect();
    if !reappeared.is_empty() {
        output.push_str(&format!(
            "\n{} Identifiers seen more than once (review manually): {}\n",
            style("⚠").yellow(),
            reappeared.join(", ")
        ));
    }

    output.push_str(&format!(
        "\nExported {} page(s) in {}ms\n",
        report.exported_count(),
        report.processing_time_ms
    ));

    output
}
