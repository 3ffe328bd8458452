//! Configuration structures for the splitting pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the invsplit pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Page signal detection configuration.
    pub detection: DetectionConfig,

    /// Output file configuration.
    pub export: ExportConfig,

    /// Batch orchestration configuration.
    pub batch: BatchConfig,
}

/// Identifier detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Number of characters inspected after an "invoice number" header.
    pub header_window: usize,

    /// Tokens that are never accepted as header-derived identifiers.
    pub stopwords: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            header_window: 50,
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Words that follow "Nº factura" headers but are not identifiers.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "VENCIMIENTOS",
    "VENCIMIENTO",
    "FACTURAS",
    "FACTURA",
    "TOTAL",
    "BASE",
    "CLIENTE",
    "IMPORTE",
    "IVA",
    "ALBARAN",
    "ALBARÁN",
    "CODIGO",
    "CÓDIGO",
    "PAGINA",
    "HOJA",
    "PAGE",
    "DATOS",
];

/// Output file naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Suffix appended after the source base name.
    pub suffix: String,

    /// Name used when the identifier has no filesystem-safe characters.
    pub placeholder: String,

    /// Maximum length of the identifier part of a file name.
    pub max_name_len: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            suffix: "_ULTIMA".to_string(),
            placeholder: "factura".to_string(),
            max_name_len: 120,
        }
    }
}

/// Folder layout and housekeeping for batch runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Folder holding the composite PDFs.
    pub source_dir_name: String,

    /// Folder receiving the exported last pages.
    pub destination_dir_name: String,

    /// Subfolder of the source where processed files are moved.
    pub processed_dir_name: String,

    /// Folder (under the base) for the run log.
    pub log_dir_name: String,

    /// Log file name.
    pub log_file_name: String,

    /// Directories checked for the source folder, starting folder included.
    pub search_depth: usize,

    /// Delete previously exported PDFs before processing.
    pub clean_destination: bool,

    /// Recipients of the end-of-run notification.
    pub notify_recipients: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_dir_name: "Facturas PDF completo La Voz".to_string(),
            destination_dir_name: "Facturas La Voz de Galicia".to_string(),
            processed_dir_name: "Procesados".to_string(),
            log_dir_name: "Log".to_string(),
            log_file_name: "invsplit.log".to_string(),
            search_depth: 6,
            clean_destination: true,
            notify_recipients: Vec::new(),
        }
    }
}

impl SplitConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "export": { "suffix": "_LAST" } }"#).unwrap();

        let config = SplitConfig::from_file(&path).unwrap();
        assert_eq!(config.export.suffix, "_LAST");
        assert_eq!(config.export.max_name_len, 120);
        assert_eq!(config.detection.header_window, 50);
        assert_eq!(config.batch.search_depth, 6);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = SplitConfig::default();
        config.batch.notify_recipients.push("ops@example.com".to_string());
        config.save(&path).unwrap();

        let loaded = SplitConfig::from_file(&path).unwrap();
        assert_eq!(loaded.batch.notify_recipients, vec!["ops@example.com".to_string()]);
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = SplitConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
