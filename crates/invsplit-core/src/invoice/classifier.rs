//! Page classifier combining identifier and closing-marker detection.

use tracing::trace;

use super::rules::{read_marker, IdentifierExtractor, IdentifierOutcome, PageMarker};
use super::SignalExtractor;
use crate::models::config::DetectionConfig;
use crate::models::segment::PageSignal;

/// Full detection result for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageAnalysis {
    /// Page index (0-based).
    pub index: usize,
    /// Identifier detection outcome.
    pub identifier: IdentifierOutcome,
    /// Page-numbering marker.
    pub marker: PageMarker,
    /// Length of the extracted text in characters.
    pub text_len: usize,
}

impl PageAnalysis {
    /// Reduce to the signal consumed by the segmenter.
    pub fn signal(&self) -> PageSignal {
        PageSignal::new(self.identifier.identifier().cloned(), self.marker.is_closing())
    }

    /// The page had no extractable text.
    pub fn is_blank(&self) -> bool {
        self.text_len == 0
    }
}

/// Classifies pages into segmentation signals.
#[derive(Debug, Clone, Default)]
pub struct PageClassifier {
    identifiers: IdentifierExtractor,
}

impl PageClassifier {
    /// Create a classifier with default detection settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier from configuration.
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            identifiers: IdentifierExtractor::from_config(config),
        }
    }

    /// Analyze one page.
    pub fn analyze(&self, index: usize, page_text: &str) -> PageAnalysis {
        let analysis = PageAnalysis {
            index,
            identifier: self.identifiers.classify(page_text),
            marker: read_marker(page_text),
            text_len: page_text.chars().count(),
        };

        trace!(
            "Page {}: identifier={:?} ({}), marker={:?}",
            index + 1,
            analysis.identifier.identifier(),
            analysis.identifier.label(),
            analysis.marker
        );

        analysis
    }
}

impl SignalExtractor for PageClassifier {
    fn signal(&self, page_text: &str) -> PageSignal {
        PageSignal::new(
            self.identifiers.detect(page_text),
            read_marker(page_text).is_closing(),
        )
    }
}
