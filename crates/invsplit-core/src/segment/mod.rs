//! Segmentation of composite documents into per-invoice page ranges.
//!
//! Identifier changes are the primary boundary signal; a "page X of Y" marker
//! with `X == Y` closes the active invoice explicitly. Pages without any
//! signal belong to whichever invoice is active.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::models::segment::{InvoiceId, PageSignal, Segment};

/// Single-pass segmentation state machine for one source document.
#[derive(Debug, Default)]
pub struct Segmenter {
    current: Option<InvoiceId>,
    first_page: HashMap<InvoiceId, usize>,
    last_page: HashMap<InvoiceId, usize>,
    discovery: HashMap<InvoiceId, u32>,
    order: Vec<InvoiceId>,
    reappeared: HashMap<InvoiceId, bool>,
    pages_seen: usize,
}

impl Segmenter {
    /// Create an empty segmenter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the signal of the next page.
    pub fn push(&mut self, signal: &PageSignal) {
        let index = self.pages_seen;
        self.pages_seen += 1;

        if signal.closing {
            if let Some(current) = &self.current {
                debug!("Closing marker ends {} at page {}", current, index + 1);
                self.last_page.insert(current.clone(), index);
            }
        }

        let Some(found) = &signal.identifier else {
            return;
        };

        match self.current.take() {
            None => {
                self.discover(found, index);
                debug!("Detected invoice {} (starts page {})", found, index + 1);
            }
            Some(previous) if &previous != found => {
                if !self.last_page.contains_key(&previous) {
                    let first = self.first_page.get(&previous).copied().unwrap_or(index);
                    let last = index.saturating_sub(1).max(first);
                    self.last_page.insert(previous.clone(), last);
                }

                if self.discovery.contains_key(found) {
                    warn!(
                        "Invoice {} reappears at page {} after {}; its last page will be overwritten",
                        found,
                        index + 1,
                        previous
                    );
                    self.reappeared.insert(found.clone(), true);
                } else {
                    self.discover(found, index);
                }
                debug!("Switched to invoice {} at page {}", found, index + 1);
            }
            Some(_) => {}
        }

        self.current = Some(found.clone());
    }

    /// Finish the scan and return the segments in discovery order.
    pub fn finish(mut self) -> Vec<Segment> {
        if let Some(current) = self.current.take() {
            if !self.last_page.contains_key(&current) && self.pages_seen > 0 {
                self.last_page.insert(current, self.pages_seen - 1);
            }
        }

        self.order
            .iter()
            .filter_map(|id| {
                let first_page = *self.first_page.get(id)?;
                let last_page = *self.last_page.get(id)?;
                Some(Segment {
                    identifier: id.clone(),
                    first_page,
                    last_page,
                    discovery_order: *self.discovery.get(id)?,
                    reappeared: self.reappeared.get(id).copied().unwrap_or(false),
                })
            })
            .collect()
    }

    fn discover(&mut self, id: &InvoiceId, index: usize) {
        let order = self.order.len() as u32 + 1;
        self.discovery.insert(id.clone(), order);
        self.first_page.insert(id.clone(), index);
        self.order.push(id.clone());
    }
}

/// Segment a whole document from its page signals.
pub fn segment_pages<'a>(signals: impl IntoIterator<Item = &'a PageSignal>) -> Vec<Segment> {
    let mut segmenter = Segmenter::new();
    for signal in signals {
        segmenter.push(signal);
    }
    segmenter.finish()
}
