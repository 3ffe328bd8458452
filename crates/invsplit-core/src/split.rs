//! Per-document pipeline: extract page signals, segment, export last pages.

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::Result;
use crate::export::Exporter;
use crate::invoice::{PageAnalysis, PageClassifier, SignalExtractor};
use crate::models::config::SplitConfig;
use crate::models::segment::{DocumentReport, PageSignal, Segment};
use crate::pdf::{PageSource, PageWriter, PdfDocument};
use crate::segment::segment_pages;

/// Splits composite invoice PDFs into one last-page file per invoice.
#[derive(Debug, Clone, Default)]
pub struct InvoiceSplitter {
    classifier: PageClassifier,
    exporter: Exporter,
}

impl InvoiceSplitter {
    /// Create a splitter with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a splitter from configuration.
    pub fn from_config(config: &SplitConfig) -> Self {
        Self {
            classifier: PageClassifier::from_config(&config.detection),
            exporter: Exporter::new(config.export.clone()),
        }
    }

    /// Detailed per-page detection results.
    pub fn analyze<S: PageSource + ?Sized>(&self, source: &S) -> Vec<PageAnalysis> {
        (0..source.page_count())
            .map(|i| self.classifier.analyze(i, &source.page_text(i)))
            .collect()
    }

    /// Resolve the segments of a document without writing anything.
    pub fn segment<S: PageSource + ?Sized>(&self, source: &S) -> Vec<Segment> {
        let signals: Vec<PageSignal> = (0..source.page_count())
            .map(|i| self.classifier.signal(&source.page_text(i)))
            .collect();
        segment_pages(&signals)
    }

    /// Split an already loaded document into `destination`.
    pub fn split_source<S: PageSource + PageWriter + ?Sized>(
        &self,
        source: &S,
        source_path: &Path,
        destination: &Path,
    ) -> Result<DocumentReport> {
        let start = Instant::now();
        let page_count = source.page_count();

        if page_count == 0 {
            warn!("PDF has no pages: {}", source_path.display());
        }

        let segments = self.segment(source);
        let base_name = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let outcome = self.exporter.export(source, &base_name, &segments, destination)?;

        info!(
            "Exported {} last page(s) from {} ({} pages, {} invoices)",
            outcome.count(),
            source_path.display(),
            page_count,
            segments.len()
        );

        Ok(DocumentReport {
            source: source_path.to_path_buf(),
            page_count,
            segments,
            exported: outcome.records,
            failures: outcome.failures,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Open and split a composite PDF file into `destination`.
    ///
    /// An unreadable source fails this document only; the source file is
    /// never modified.
    pub fn split_file(&self, path: &Path, destination: &Path) -> Result<DocumentReport> {
        info!("Processing composite PDF: {}", path.display());
        let document = PdfDocument::open(path)?;
        self.split_source(&document, path, destination)
    }
}
