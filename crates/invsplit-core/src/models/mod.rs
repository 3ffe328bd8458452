//! Data models and configuration.

pub mod config;
pub mod segment;

pub use config::{BatchConfig, DetectionConfig, ExportConfig, SplitConfig};
pub use segment::{DocumentReport, ExportFailure, ExportRecord, InvoiceId, PageSignal, Segment};
