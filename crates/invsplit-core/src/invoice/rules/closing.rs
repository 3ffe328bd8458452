//! "Página X de Y" closing-marker detection.

use serde::Serialize;

use super::patterns::PAGE_X_OF_Y;

/// Page-numbering marker found on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageMarker {
    /// No "page X of Y" phrase.
    Absent,
    /// A parsed "page X of Y" phrase.
    Sequence { current: u32, total: u32 },
    /// The phrase matched but its numbers could not be parsed.
    Malformed { text: String },
}

impl PageMarker {
    /// The page closes its numbered sequence (`X == Y`, `Y > 0`).
    pub fn is_closing(&self) -> bool {
        matches!(self, Self::Sequence { current, total } if *total > 0 && current == total)
    }
}

/// Read the first "page X of Y" marker on a page.
pub fn read_marker(page_text: &str) -> PageMarker {
    let Some(caps) = PAGE_X_OF_Y.captures(page_text) else {
        return PageMarker::Absent;
    };

    match (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
        (Ok(current), Ok(total)) => PageMarker::Sequence { current, total },
        _ => PageMarker::Malformed {
            text: caps[0].to_string(),
        },
    }
}

/// Whether the page declares itself the last of its sequence.
pub fn is_closing_page(page_text: &str) -> bool {
    read_marker(page_text).is_closing()
}
