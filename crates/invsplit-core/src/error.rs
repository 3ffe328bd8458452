//! Error types for the invsplit-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the invsplit library.
#[derive(Error, Debug)]
pub enum SplitError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Page export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to serialize a PDF document.
    #[error("failed to save PDF: {0}")]
    Save(String),

    /// Invalid page index requested (0-based).
    #[error("invalid page index: {0}")]
    InvalidPage(usize),
}

/// Errors related to writing exported pages.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Writing a single output file failed.
    #[error("failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    /// The destination directory is unusable.
    #[error("invalid destination {0}")]
    Destination(PathBuf),
}

/// Result type for the invsplit library.
pub type Result<T> = std::result::Result<T, SplitError>;
