//! PDF processing module.

mod extractor;
#[cfg(test)]
pub(crate) mod testing;

pub use extractor::PdfDocument;

use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Read access to the pages of a source document.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Plain text of a page (0-based). Empty when extraction fails.
    fn page_text(&self, index: usize) -> String;
}

/// Writes single pages of a source document as standalone PDFs.
pub trait PageWriter {
    /// Write page `index` (0-based) as a one-page PDF at `path`.
    fn write_page(&self, index: usize, path: &Path) -> Result<()>;
}
