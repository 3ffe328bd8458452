//! Data models for page signals, resolved segments, and export records.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A normalized invoice identifier (uppercase, no whitespace).
///
/// Two identifiers are equal iff their normalized forms are equal, so the
/// only way to build one is through [`InvoiceId::normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(String);

impl InvoiceId {
    /// Normalize a raw token: trim surrounding `:#.-` and spaces, drop all
    /// whitespace, uppercase.
    ///
    /// Returns `None` when nothing is left.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_matches(|c: char| matches!(c, ' ' | ':' | '#' | '.' | '-'));
        let compact: String = trimmed
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect();

        if compact.is_empty() {
            None
        } else {
            Some(Self(compact))
        }
    }

    /// Borrow the normalized string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for InvoiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Per-page reduction consumed by the segmenter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSignal {
    /// Identifier found on the page, if any.
    pub identifier: Option<InvoiceId>,
    /// The page declares itself the last of a numbered sequence.
    pub closing: bool,
}

impl PageSignal {
    pub fn new(identifier: Option<InvoiceId>, closing: bool) -> Self {
        Self { identifier, closing }
    }

    /// A page with no identifier and no closing marker.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The resolved page range of one invoice inside one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Invoice identifier.
    pub identifier: InvoiceId,
    /// First page (0-based).
    pub first_page: usize,
    /// Last page (0-based). This is the page that gets exported.
    pub last_page: usize,
    /// 1-based order in which the identifier was first seen.
    pub discovery_order: u32,
    /// The identifier became active again after another one intervened.
    #[serde(default)]
    pub reappeared: bool,
}

impl Segment {
    /// Number of pages covered by the range, clamped to at least one.
    pub fn page_span(&self) -> usize {
        self.last_page.saturating_sub(self.first_page) + 1
    }
}

/// A segment that was written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// The exported segment.
    pub segment: Segment,
    /// Path of the written single-page PDF.
    pub output_path: PathBuf,
}

/// A segment whose export failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFailure {
    /// The segment that could not be written.
    pub segment: Segment,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Outcome of splitting one composite document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Source document path.
    pub source: PathBuf,
    /// Number of pages in the source.
    pub page_count: usize,
    /// Resolved segments, in discovery order.
    pub segments: Vec<Segment>,
    /// Written files, in discovery order.
    pub exported: Vec<ExportRecord>,
    /// Segments that could not be written.
    pub failures: Vec<ExportFailure>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl DocumentReport {
    /// Number of pages exported.
    pub fn exported_count(&self) -> usize {
        self.exported.len()
    }

    /// Every segment was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_and_uppercases() {
        let id = InvoiceId::normalize("  d24 14318. ").unwrap();
        assert_eq!(id.as_str(), "D2414318");
    }

    #[test]
    fn test_normalize_trims_punctuation() {
        assert_eq!(InvoiceId::normalize("#:A-77/2024-").unwrap().as_str(), "A-77/2024");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(InvoiceId::normalize(" .-: "), None);
        assert_eq!(InvoiceId::normalize(""), None);
    }

    #[test]
    fn test_equality_by_normalized_form() {
        assert_eq!(InvoiceId::normalize("d2414318"), InvoiceId::normalize("D24 14318"));
    }

    #[test]
    fn test_page_span() {
        let segment = Segment {
            identifier: InvoiceId::normalize("A1").unwrap(),
            first_page: 3,
            last_page: 5,
            discovery_order: 2,
            reappeared: false,
        };
        assert_eq!(segment.page_span(), 3);
    }
}
