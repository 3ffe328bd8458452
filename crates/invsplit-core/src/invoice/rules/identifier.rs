//! Invoice identifier detection.
//!
//! Two tiers, first match wins:
//! 1. the primary `D24.14318` format anywhere on the page;
//! 2. the token following an "Nº factura" style header, inspected within a
//!    short window (primary format first, then the first digit-bearing token
//!    that is not a stopword).

use std::collections::HashSet;

use super::patterns::{HEADER_TOKEN_JUNK, HEADER_TOKEN_SPLIT, INVOICE_ID_PRIMARY, INVOICE_NUMBER_HEADER};
use super::ExtractionMatch;
use crate::models::config::{DetectionConfig, DEFAULT_STOPWORDS};
use crate::models::segment::InvoiceId;

const PRIMARY_CONFIDENCE: f32 = 0.95;
const HEADER_CONFIDENCE: f32 = 0.6;

/// How (and whether) an identifier was found on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentifierOutcome {
    /// Primary format found anywhere on the page.
    Primary(ExtractionMatch<InvoiceId>),
    /// Token taken from the window after an invoice-number header.
    Header(ExtractionMatch<InvoiceId>),
    /// A header was present but the token after it was not acceptable.
    Rejected { token: Option<String> },
    /// No identifier signal on this page.
    NotFound,
}

impl IdentifierOutcome {
    /// The detected identifier, if any.
    pub fn identifier(&self) -> Option<&InvoiceId> {
        match self {
            Self::Primary(m) | Self::Header(m) => Some(&m.value),
            Self::Rejected { .. } | Self::NotFound => None,
        }
    }

    /// The underlying match, with the matched text and its span.
    pub fn matched(&self) -> Option<&ExtractionMatch<InvoiceId>> {
        match self {
            Self::Primary(m) | Self::Header(m) => Some(m),
            Self::Rejected { .. } | Self::NotFound => None,
        }
    }

    pub fn into_identifier(self) -> Option<InvoiceId> {
        match self {
            Self::Primary(m) | Self::Header(m) => Some(m.value),
            Self::Rejected { .. } | Self::NotFound => None,
        }
    }

    pub fn confidence(&self) -> f32 {
        match self {
            Self::Primary(m) | Self::Header(m) => m.confidence,
            Self::Rejected { .. } | Self::NotFound => 0.0,
        }
    }

    /// Short label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary(_) => "primary",
            Self::Header(_) => "header",
            Self::Rejected { .. } => "rejected",
            Self::NotFound => "none",
        }
    }
}

/// Invoice identifier extractor.
#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    header_window: usize,
    stopwords: HashSet<String>,
}

impl IdentifierExtractor {
    /// Create an extractor with the default window and stoplist.
    pub fn new() -> Self {
        Self {
            header_window: 50,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_uppercase()).collect(),
        }
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new()
            .with_header_window(config.header_window)
            .with_stopwords(config.stopwords.iter().map(String::as_str))
    }

    /// Set the number of characters inspected after a header.
    pub fn with_header_window(mut self, chars: usize) -> Self {
        self.header_window = chars;
        self
    }

    /// Replace the stoplist.
    pub fn with_stopwords<'a>(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        self.stopwords = words.into_iter().map(|w| w.trim().to_uppercase()).collect();
        self
    }

    /// Classify a page's text.
    pub fn classify(&self, page_text: &str) -> IdentifierOutcome {
        let text = collapse_whitespace(page_text);

        if let Some(found) = primary_match(&text, 0) {
            return IdentifierOutcome::Primary(found);
        }

        let Some(header) = INVOICE_NUMBER_HEADER.find(&text) else {
            return IdentifierOutcome::NotFound;
        };

        let rest = &text[header.end()..];
        let window_end = rest
            .char_indices()
            .nth(self.header_window)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let window = &rest[..window_end];

        if let Some(found) = primary_match(window, header.end()) {
            return IdentifierOutcome::Primary(found);
        }

        // First token that survives cleanup; bare punctuation such as ":" or "#" is skipped
        let candidate = HEADER_TOKEN_SPLIT.split(window.trim()).find_map(|token| {
            InvoiceId::normalize(&HEADER_TOKEN_JUNK.replace_all(token, "")).map(|id| (token, id))
        });

        match candidate {
            Some((token, id)) if self.is_acceptable(&id) => {
                let start = header.end() + window.find(token).unwrap_or(0);
                IdentifierOutcome::Header(
                    ExtractionMatch::new(id, HEADER_CONFIDENCE, token)
                        .with_position(start, start + token.len()),
                )
            }
            Some((_, id)) => IdentifierOutcome::Rejected {
                token: Some(id.as_str().to_string()),
            },
            None => IdentifierOutcome::Rejected { token: None },
        }
    }

    /// Detect the identifier on a page, if any.
    pub fn detect(&self, page_text: &str) -> Option<InvoiceId> {
        self.classify(page_text).into_identifier()
    }

    fn is_acceptable(&self, id: &InvoiceId) -> bool {
        id.as_str().chars().any(|c| c.is_ascii_digit()) && !self.stopwords.contains(id.as_str())
    }
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect an invoice identifier with default settings.
pub fn detect_identifier(page_text: &str) -> Option<InvoiceId> {
    IdentifierExtractor::new().detect(page_text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn primary_match(text: &str, offset: usize) -> Option<ExtractionMatch<InvoiceId>> {
    INVOICE_ID_PRIMARY
        .captures(text)
        .and_then(|caps| primary_from_captures(&caps, offset))
}

fn primary_from_captures(caps: &regex::Captures<'_>, offset: usize) -> Option<ExtractionMatch<InvoiceId>> {
    let full = caps.get(0)?;
    let id = InvoiceId::normalize(&format!("{}{}{}", &caps[1], &caps[2], &caps[3]))?;
    Some(
        ExtractionMatch::new(id, PRIMARY_CONFIDENCE, full.as_str())
            .with_position(offset + full.start(), offset + full.end()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Option<InvoiceId> {
        InvoiceId::normalize(s)
    }

    #[test]
    fn test_primary_any_separator() {
        for text in [
            "Factura D24.14318 de fecha 01/02/2024",
            "Factura D24-14318",
            "Factura D24/14318",
            "Factura D24 14318",
            "Factura D2414318",
            "factura d24.14318",
        ] {
            assert_eq!(detect_identifier(text), id("D2414318"), "{text}");
        }
    }

    #[test]
    fn test_primary_six_digits() {
        assert_eq!(detect_identifier("Ref: A23.123456 total"), id("A23123456"));
    }

    #[test]
    fn test_primary_across_line_breaks() {
        let text = "DISTRIBUIDORA\nFactura\nD24\n14318\nCliente 13197";
        assert_eq!(detect_identifier(text), id("D2414318"));
    }

    #[test]
    fn test_primary_is_classified_with_high_confidence() {
        let outcome = IdentifierExtractor::new().classify("Nº factura D24.14318");
        assert_eq!(outcome.label(), "primary");
        assert!(outcome.confidence() > 0.9);
    }

    #[test]
    fn test_header_token() {
        let text = "Nº factura: 2024/0815 Fecha: 12/03/2024";
        assert_eq!(detect_identifier(text), id("2024/0815"));

        let outcome = IdentifierExtractor::new().classify(text);
        assert_eq!(outcome.label(), "header");
    }

    #[test]
    fn test_header_variants() {
        assert_eq!(detect_identifier("No. factura FAC-881"), id("FAC-881"));
        assert_eq!(detect_identifier("N. factura # 77A"), id("77A"));
        assert_eq!(detect_identifier("N° de factura 1203"), id("1203"));
    }

    #[test]
    fn test_header_stopword_rejected() {
        let text = "Nº factura Vencimientos 30 días";
        let outcome = IdentifierExtractor::new().classify(text);
        assert_eq!(
            outcome,
            IdentifierOutcome::Rejected { token: Some("VENCIMIENTOS".to_string()) }
        );
        assert_eq!(outcome.identifier(), None);
    }

    #[test]
    fn test_header_followed_by_stopwords_only() {
        for text in [
            "Nº factura TOTAL IVA BASE",
            "No. factura: Cliente",
            "N. factura Datos del cliente",
        ] {
            assert_eq!(detect_identifier(text), None, "{text}");
        }
    }

    #[test]
    fn test_custom_stopword_with_digits() {
        let extractor = IdentifierExtractor::new().with_stopwords(["iva21"]);
        assert_eq!(extractor.detect("Nº factura IVA21 base"), None);
        assert_eq!(IdentifierExtractor::new().detect("Nº factura IVA21 base"), id("IVA21"));
    }

    #[test]
    fn test_header_token_needs_digit() {
        assert_eq!(detect_identifier("Nº factura ABCDEF"), None);
    }

    #[test]
    fn test_header_window_limits_token() {
        let extractor = IdentifierExtractor::new().with_header_window(3);
        // The window cuts "12345" down to "12"
        assert_eq!(extractor.detect("Nº factura 12345"), id("12"));
    }

    #[test]
    fn test_no_signal() {
        assert_eq!(detect_identifier(""), None);
        assert_eq!(detect_identifier("Condiciones generales de venta"), None);
        assert_eq!(IdentifierExtractor::new().classify("texto").label(), "none");
    }

    #[test]
    fn test_match_records_span_and_text() {
        let extractor = IdentifierExtractor::new();

        let primary = extractor.classify("Factura\n  D24.14318 total");
        let found = primary.matched().unwrap();
        assert_eq!(found.source, "D24.14318");
        assert_eq!(found.position, Some((8, 17)));

        let header = extractor.classify("Nº factura: 2024/0815");
        let found = header.matched().unwrap();
        assert_eq!(found.source, "2024/0815");
        let (start, end) = found.position.unwrap();
        assert_eq!(&"Nº factura: 2024/0815"[start..end], "2024/0815");

        assert!(extractor.classify("texto").matched().is_none());
    }
}
