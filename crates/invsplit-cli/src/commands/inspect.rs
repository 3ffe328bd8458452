//! Inspect command - show how a composite PDF would be split.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use invsplit_core::models::config::SplitConfig;
use invsplit_core::{InvoiceSplitter, PageAnalysis, PageMarker, PageSource, PdfDocument, Segment};

use super::split::OutputFormat;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Composite PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Serialize)]
struct InspectReport<'a> {
    source: &'a PathBuf,
    page_count: usize,
    pages: Vec<PageRow<'a>>,
    segments: Vec<Segment>,
}

#[derive(Serialize)]
struct PageRow<'a> {
    page: usize,
    identifier: Option<&'a str>,
    detection: &'static str,
    confidence: f32,
    matched: Option<&'a str>,
    span: Option<(usize, usize)>,
    marker: &'a PageMarker,
    closing: bool,
    blank: bool,
}

impl<'a> From<&'a PageAnalysis> for PageRow<'a> {
    fn from(analysis: &'a PageAnalysis) -> Self {
        Self {
            page: analysis.index + 1,
            identifier: analysis.identifier.identifier().map(|id| id.as_str()),
            detection: analysis.identifier.label(),
            confidence: analysis.identifier.confidence(),
            matched: analysis.identifier.matched().map(|m| m.source.as_str()),
            span: analysis.identifier.matched().and_then(|m| m.position),
            marker: &analysis.marker,
            closing: analysis.marker.is_closing(),
            blank: analysis.is_blank(),
        }
    }
}

pub fn run(args: InspectArgs, config: &SplitConfig) -> anyhow::Result<()> {
    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Inspecting file: {}", args.input.display());

    let document = PdfDocument::open(&args.input)?;
    let splitter = InvoiceSplitter::from_config(config);
    let analyses = splitter.analyze(&document);
    let segments = splitter.segment(&document);

    let report = InspectReport {
        source: &args.input,
        page_count: document.page_count(),
        pages: analyses.iter().map(PageRow::from).collect(),
        segments,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", format_text(&report)),
    }

    Ok(())
}

fn format_text(report: &InspectReport<'_>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Source: {}\n", report.source.display()));
    output.push_str(&format!("Pages: {}\n\n", report.page_count));

    for row in &report.pages {
        let marker = match row.marker {
            PageMarker::Absent => "-".to_string(),
            PageMarker::Sequence { current, total } => format!("{}/{}", current, total),
            PageMarker::Malformed { text } => format!("? ({})", text),
        };
        let matched = match (row.matched, row.span) {
            (Some(text), Some((start, end))) => format!("\"{}\"@{}..{}", text, start, end),
            (Some(text), None) => format!("\"{}\"", text),
            _ => "-".to_string(),
        };
        let closing = if row.closing {
            style("closing").cyan().to_string()
        } else {
            String::new()
        };

        output.push_str(&format!(
            "  p{:<4} {:<14} {:<8} {:>4.2}  {:<20} {:<8} {}{}\n",
            row.page,
            row.identifier.unwrap_or("-"),
            row.detection,
            row.confidence,
            matched,
            marker,
            closing,
            if row.blank { " (no text)" } else { "" }
        ));
    }

    output.push('\n');
    if report.segments.is_empty() {
        output.push_str(&format!(
            "{} No invoice identifiers found\n",
            style("⚠").yellow()
        ));
    }

    for segment in &report.segments {
        output.push_str(&format!(
            "  {:03} {:<14} pages {}-{} ({} page(s)), keeps page {}{}\n",
            segment.discovery_order,
            segment.identifier,
            segment.first_page + 1,
            segment.last_page + 1,
            segment.page_span(),
            segment.last_page + 1,
            if segment.reappeared { " (reappeared)" } else { "" }
        ));
    }

    output
}
