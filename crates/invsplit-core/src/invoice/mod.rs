//! Per-page signal extraction for composite invoice documents.

mod classifier;
pub mod rules;

pub use classifier::{PageAnalysis, PageClassifier};

use crate::models::segment::PageSignal;

/// Trait for reducing a page's text to segmentation signals.
pub trait SignalExtractor {
    /// Reduce page text to its identifier and closing-marker signals.
    fn signal(&self, page_text: &str) -> PageSignal;
}
