//! PDF page text extraction and single-page export using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use tracing::{debug, info, warn};

use super::{PageSource, PageWriter, Result};
use crate::error::PdfError;

/// A loaded source document with its page texts.
pub struct PdfDocument {
    document: Document,
    /// lopdf page numbers (1-based) in page order.
    page_numbers: Vec<u32>,
    /// Extracted text per page, same order as `page_numbers`.
    page_texts: Vec<String>,
}

impl PdfDocument {
    /// Open a PDF file.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|e| PdfError::Parse(format!("{}: {}", path.display(), e)))?;
        Self::load(&data)
    }

    /// Load a PDF from bytes.
    ///
    /// Encrypted documents get a single empty-password decryption attempt;
    /// when that fails the document is kept as is and whatever text is
    /// readable is used.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let mut decrypted_data = None;
        if document.is_encrypted() {
            match document.decrypt("") {
                Ok(()) => {
                    info!("Decrypted PDF with empty password");
                    // pdf-extract needs the decrypted bytes
                    let mut buffer = Vec::new();
                    match document.save_to(&mut buffer) {
                        Ok(()) => decrypted_data = Some(buffer),
                        Err(e) => warn!("Failed to re-serialize decrypted PDF: {}", e),
                    }
                }
                Err(e) => warn!("Could not decrypt PDF with empty password ({}); continuing with readable pages", e),
            }
        }

        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        let raw = decrypted_data.as_deref().unwrap_or(data);
        let page_texts = extract_page_texts(&document, raw, &page_numbers);

        debug!("Loaded PDF with {} pages", page_numbers.len());

        Ok(Self {
            document,
            page_numbers,
            page_texts,
        })
    }

    /// Extracted text of every page, in order.
    pub fn page_texts(&self) -> &[String] {
        &self.page_texts
    }

    fn page_number(&self, index: usize) -> Result<u32> {
        self.page_numbers
            .get(index)
            .copied()
            .ok_or(PdfError::InvalidPage(index))
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> String {
        self.page_texts.get(index).cloned().unwrap_or_default()
    }
}

impl PageWriter for PdfDocument {
    fn write_page(&self, index: usize, path: &Path) -> Result<()> {
        let keep = self.page_number(index)?;
        let others: Vec<u32> = self
            .page_numbers
            .iter()
            .copied()
            .filter(|&n| n != keep)
            .collect();

        let mut single = self.document.clone();
        single.delete_pages(&others);
        single.prune_objects();

        let mut buffer = Vec::new();
        single
            .save_to(&mut buffer)
            .map_err(|e| PdfError::Save(e.to_string()))?;
        std::fs::write(path, buffer)
            .map_err(|e| PdfError::Save(format!("{}: {}", path.display(), e)))?;

        debug!("Wrote page {} to {}", index + 1, path.display());
        Ok(())
    }
}

/// Extract the text of every page, never failing.
///
/// pdf-extract is tried first on the whole document; if it fails (or panics,
/// which it does on some malformed fonts) or returns a different page count,
/// each page falls back to lopdf's own text extraction. Pages that still fail
/// yield an empty string.
fn extract_page_texts(document: &Document, raw: &[u8], page_numbers: &[u32]) -> Vec<String> {
    if page_numbers.is_empty() {
        return Vec::new();
    }

    let by_pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(raw)
    }));

    match by_pages {
        Ok(Ok(texts)) if texts.len() == page_numbers.len() => return texts,
        Ok(Ok(texts)) => debug!(
            "pdf-extract returned {} pages, expected {}; using lopdf",
            texts.len(),
            page_numbers.len()
        ),
        Ok(Err(e)) => debug!("pdf-extract failed: {}; using lopdf", e),
        Err(_) => debug!("pdf-extract panicked; using lopdf"),
    }

    page_numbers
        .iter()
        .map(|&n| match document.extract_text(&[n]) {
            Ok(text) => text,
            Err(e) => {
                debug!("Text extraction failed for page {}: {}", n, e);
                String::new()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testing::build_pdf;
    use lopdf::dictionary;

    #[test]
    fn test_load_reports_pages_and_text() {
        let data = build_pdf(&["Factura D24.14318", "Pagina 2 de 2"]);
        let doc = PdfDocument::load(&data).unwrap();

        assert_eq!(doc.page_count(), 2);
        assert!(doc.page_text(0).contains("D24.14318"));
        assert!(doc.page_text(1).contains("Pagina 2 de 2"));
    }

    #[test]
    fn test_out_of_range_text_is_empty() {
        let doc = PdfDocument::load(&build_pdf(&["uno"])).unwrap();
        assert_eq!(doc.page_text(7), "");
    }

    #[test]
    fn test_zero_pages_is_not_an_error() {
        let doc = PdfDocument::load(&build_pdf(&[])).unwrap();
        assert_eq!(doc.page_count(), 0);
        assert!(doc.page_texts().is_empty());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = PdfDocument::load(b"definitely not a pdf").err().unwrap();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_write_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("page.pdf");

        let doc = PdfDocument::load(&build_pdf(&["first A11.11111", "second B22.22222", "third"])).unwrap();
        doc.write_page(1, &out).unwrap();

        let written = PdfDocument::open(&out).unwrap();
        assert_eq!(written.page_count(), 1);
        assert!(written.page_text(0).contains("B22.22222"));
    }

    #[test]
    fn test_write_invalid_page() {
        let dir = tempfile::tempdir().unwrap();
        let doc = PdfDocument::load(&build_pdf(&["only"])).unwrap();

        let err = doc.write_page(3, &dir.path().join("x.pdf")).unwrap_err();
        assert!(matches!(err, PdfError::InvalidPage(3)));
    }

    #[test]
    fn test_undecryptable_document_is_still_read() {
        let mut document = Document::load_mem(&build_pdf(&["Factura D24.14318", "Pagina 2 de 2"])).unwrap();
        // Unsupported security handler: the empty-password attempt must fail
        document.trailer.set(
            "Encrypt",
            lopdf::dictionary! {
                "Filter" => "Standard",
                "V" => 9,
                "R" => 9,
                "Length" => 128,
                "P" => -1,
                "O" => lopdf::Object::string_literal("owner"),
                "U" => lopdf::Object::string_literal("user"),
            },
        );
        let mut data = Vec::new();
        document.save_to(&mut data).unwrap();

        let doc = PdfDocument::load(&data).unwrap();

        assert_eq!(doc.page_count(), 2);
        assert!(doc.page_text(0).contains("D24.14318"));
    }
}
