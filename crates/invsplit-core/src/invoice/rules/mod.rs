//! Rule-based page signal extractors for composite invoice documents.

pub mod closing;
pub mod identifier;
pub mod patterns;

pub use closing::{is_closing_page, read_marker, PageMarker};
pub use identifier::{detect_identifier, IdentifierExtractor, IdentifierOutcome};
pub use patterns::*;

/// Extraction context with confidence scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Byte span in the whitespace-collapsed page text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
