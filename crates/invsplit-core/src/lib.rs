//! Core library for splitting composite invoice PDFs.
//!
//! This crate provides:
//! - PDF page text extraction and single-page export
//! - Invoice identifier and "page X of Y" closing-marker detection
//! - Segmentation of composite documents into per-invoice page ranges
//! - Export of the last page of every invoice with collision-free names

pub mod error;
pub mod export;
pub mod invoice;
pub mod models;
pub mod pdf;
pub mod segment;
pub mod split;

pub use error::{ExportError, PdfError, Result, SplitError};
pub use export::{ExportOutcome, Exporter};
pub use invoice::rules::{detect_identifier, is_closing_page, IdentifierOutcome, PageMarker};
pub use invoice::{PageAnalysis, PageClassifier, SignalExtractor};
pub use models::config::SplitConfig;
pub use models::segment::{DocumentReport, ExportRecord, InvoiceId, PageSignal, Segment};
pub use pdf::{PageSource, PageWriter, PdfDocument};
pub use segment::{segment_pages, Segmenter};
pub use split::InvoiceSplitter;
