//! Common regex patterns for composite invoice page signals.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Primary identifier format: letter + 2 digits + optional separator + 5-6 digits
    // (D24.14318, D24-14318, D24/14318, D24 14318, D2414318)
    pub static ref INVOICE_ID_PRIMARY: Regex = Regex::new(
        r"(?i)\b([A-Z])(\d{2})[\s./\-]?(\d{5,6})\b"
    ).unwrap();

    // "Nº factura" header and its OCR/typographic variants
    pub static ref INVOICE_NUMBER_HEADER: Regex = Regex::new(
        r"(?i)(?:N[.°º]?\s*o?\.?|Nº|No\.?|N\.)\s*(?:de\s*)?factura\b"
    ).unwrap();

    // Separators used to cut the header window into tokens
    pub static ref HEADER_TOKEN_SPLIT: Regex = Regex::new(
        r"[\s,:;|]+"
    ).unwrap();

    // Characters kept in a header-derived token
    pub static ref HEADER_TOKEN_JUNK: Regex = Regex::new(
        r"[^\w/.\-]"
    ).unwrap();

    // "Página X de Y", "Hoja X/Y", "Page X of Y"
    pub static ref PAGE_X_OF_Y: Regex = Regex::new(
        r"(?i)(?:p[aá]gina|hoja|page)\s*(\d{1,3})\s*(?:/|⁄|de|of)\s*(\d{1,3})"
    ).unwrap();

    // Runs of characters that are unsafe in file names
    pub static ref UNSAFE_FILENAME_RUN: Regex = Regex::new(
        r"[^A-Za-z0-9\-_.]+"
    ).unwrap();
}
