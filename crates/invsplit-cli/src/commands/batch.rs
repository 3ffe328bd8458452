//! Batch command - split every composite PDF in the source folder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use glob::{glob_with, MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use invsplit_core::models::config::{BatchConfig, SplitConfig};
use invsplit_core::{DocumentReport, InvoiceSplitter};

use crate::notify::{notify_all, LogNotifier};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory to start looking for the source folder (default: current directory)
    #[arg(short, long)]
    base: Option<PathBuf>,

    /// Keep previously exported PDFs in the destination folder
    #[arg(long)]
    keep_existing: bool,

    /// Leave processed sources in place
    #[arg(long)]
    no_move: bool,

    /// Also write a summary CSV to the log folder
    #[arg(long)]
    summary: bool,

    /// Do not append to the run log file
    #[arg(long)]
    no_log_file: bool,
}

/// Result of processing a single source file.
struct ProcessResult {
    path: PathBuf,
    report: Option<DocumentReport>,
    moved_to: Option<PathBuf>,
    error: Option<String>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Resolve the run log file, creating its folder.
pub fn log_file(args: &BatchArgs, config: &SplitConfig) -> anyhow::Result<Option<PathBuf>> {
    if args.no_log_file {
        return Ok(None);
    }

    let base = resolve_base(args.base.as_deref(), &config.batch)?;
    let log_dir = base.join(&config.batch.log_dir_name);
    fs::create_dir_all(&log_dir)?;

    Ok(Some(log_dir.join(&config.batch.log_file_name)))
}

pub fn run(args: BatchArgs, config: &SplitConfig) -> anyhow::Result<()> {
    let start = Instant::now();
    let batch = &config.batch;

    let base = resolve_base(args.base.as_deref(), batch)?;
    info!("Base directory: {}", base.display());

    let source_dir = find_dir_case_insensitive(&base, &batch.source_dir_name).ok_or_else(|| {
        anyhow::anyhow!(
            "Source folder '{}' not found under {}",
            batch.source_dir_name,
            base.display()
        )
    })?;

    let destination = match find_dir_case_insensitive(&base, &batch.destination_dir_name) {
        Some(dir) => dir,
        None => {
            let dir = base.join(&batch.destination_dir_name);
            fs::create_dir_all(&dir)?;
            info!("Created destination folder {}", dir.display());
            dir
        }
    };

    if batch.clean_destination && !args.keep_existing {
        let removed = clean_destination(&destination);
        info!("Removed {} previous PDF(s) from {}", removed, destination.display());
    }

    let files = list_sources(&source_dir)?;
    if files.is_empty() {
        println!(
            "{} No PDF files found in {}",
            style("ℹ").blue(),
            source_dir.display()
        );
        return Ok(());
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let splitter = InvoiceSplitter::from_config(config);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let mut result = ProcessResult {
            path: path.clone(),
            report: None,
            moved_to: None,
            error: None,
            processing_time_ms: 0,
        };

        match splitter.split_file(&path, &destination) {
            Ok(report) if report.is_complete() => {
                if !args.no_move {
                    match move_to_processed(&path, &source_dir, &batch.processed_dir_name) {
                        Ok(target) => {
                            debug!("Moved {} to {}", path.display(), target.display());
                            result.moved_to = Some(target);
                        }
                        Err(e) => warn!("Could not move {}: {}", path.display(), e),
                    }
                }
                result.report = Some(report);
            }
            Ok(report) => {
                let reason = format!(
                    "{} of {} last pages could not be written",
                    report.failures.len(),
                    report.segments.len()
                );
                warn!("{}: {}", path.display(), reason);
                result.error = Some(reason);
                result.report = Some(report);
            }
            Err(e) => {
                error!("Failed to process {}: {}", path.display(), e);
                result.error = Some(e.to_string());
            }
        }

        result.processing_time_ms = file_start.elapsed().as_millis() as u64;
        results.push(result);
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let successful = results.iter().filter(|r| r.succeeded()).count();
    let failed: Vec<_> = results.iter().filter(|r| !r.succeeded()).collect();
    let exported: usize = results
        .iter()
        .filter_map(|r| r.report.as_ref())
        .map(|r| r.exported_count())
        .sum();

    if args.summary {
        let log_dir = base.join(&batch.log_dir_name);
        fs::create_dir_all(&log_dir)?;
        let summary_path = log_dir.join(format!(
            "summary_{}.csv",
            Local::now().format("%Y%m%d_%H%M%S")
        ));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let body = summary_text(&results, exported);
    info!("{}", body);
    notify_all(
        &LogNotifier,
        &batch.notify_recipients,
        "Invoice split finished",
        &body,
    );

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} last pages exported, {} successful, {} failed",
        style(exported).cyan(),
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn resolve_base(explicit: Option<&Path>, config: &BatchConfig) -> anyhow::Result<PathBuf> {
    let start = match explicit {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?,
    };
    if !start.is_dir() {
        anyhow::bail!("Base directory not found: {}", start.display());
    }
    let start = start.canonicalize()?;

    Ok(find_base(&start, &config.source_dir_name, config.search_depth))
}

/// Walk up from `start` looking for a directory containing `target`.
///
/// Checks `depth` directories in total (`start` and its first `depth - 1`
/// ancestors) and falls back to `start` when none has it.
fn find_base(start: &Path, target: &str, depth: usize) -> PathBuf {
    let mut current = Some(start);
    for _ in 0..depth {
        let Some(dir) = current else { break };
        if find_dir_case_insensitive(dir, target).is_some() {
            return dir.to_path_buf();
        }
        current = dir.parent();
    }

    debug!("'{}' not found above {}, using it as base", target, start.display());
    start.to_path_buf()
}

/// Find a direct subdirectory of `base` by case-insensitive name.
fn find_dir_case_insensitive(base: &Path, name: &str) -> Option<PathBuf> {
    let exact = base.join(name);
    if exact.is_dir() {
        return Some(exact);
    }

    let wanted = name.to_lowercase();
    fs::read_dir(base)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.is_dir()
                && path
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().to_lowercase() == wanted)
        })
}

/// Delete PDFs directly inside `dir`. Returns how many were removed.
fn clean_destination(dir: &Path) -> usize {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Could not list {}: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
        if !path.is_file() || !is_pdf(&path) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Could not delete {}: {}", path.display(), e),
        }
    }
    removed
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// PDFs directly inside `dir`, sorted by file name.
fn list_sources(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.pdf", Pattern::escape(&dir.to_string_lossy()));
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let mut files: Vec<PathBuf> = glob_with(&pattern, options)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .collect();
    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));

    Ok(files)
}

/// Move a processed source into `<source_dir>/<processed>`, never overwriting.
fn move_to_processed(path: &Path, source_dir: &Path, processed: &str) -> anyhow::Result<PathBuf> {
    let target_dir = source_dir.join(processed);
    fs::create_dir_all(&target_dir)?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut target = target_dir.join(format!("{}{}", stem, extension));
    let mut k = 1;
    while target.exists() {
        target = target_dir.join(format!("{}_{}{}", stem, k, extension));
        k += 1;
    }

    fs::rename(path, &target)?;
    Ok(target)
}

fn summary_text(results: &[ProcessResult], exported: usize) -> String {
    let failed: Vec<String> = results
        .iter()
        .filter(|r| !r.succeeded())
        .map(|r| {
            format!(
                "{}: {}",
                r.path.display(),
                r.error.as_deref().unwrap_or("unknown error")
            )
        })
        .collect();

    let mut body = format!(
        "Processed {} file(s), exported {} last page(s), {} error(s)",
        results.len(),
        exported,
        failed.len()
    );
    for line in failed {
        body.push_str("\n  - ");
        body.push_str(&line);
    }
    body
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "pages",
        "invoices",
        "exported",
        "failed_segments",
        "moved_to",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let status = if result.succeeded() { "success" } else { "error" };
        let (pages, invoices, exported, failed) = match &result.report {
            Some(report) => (
                report.page_count.to_string(),
                report.segments.len().to_string(),
                report.exported_count().to_string(),
                report.failures.len().to_string(),
            ),
            None => Default::default(),
        };
        let moved_to = result
            .moved_to
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        wtr.write_record([
            filename.as_str(),
            status,
            &pages,
            &invoices,
            &exported,
            &failed,
            &moved_to,
            &result.processing_time_ms.to_string(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
