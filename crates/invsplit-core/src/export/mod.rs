//! Export of the last page of each segment as a standalone PDF.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::ExportError;
use crate::models::config::ExportConfig;
use crate::models::segment::{ExportFailure, ExportRecord, Segment};
use crate::invoice::rules::UNSAFE_FILENAME_RUN;
use crate::pdf::PageWriter;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Files written (and not written) by one export pass.
#[derive(Debug, Clone, Default)]
pub struct ExportOutcome {
    /// Written files, in discovery order.
    pub records: Vec<ExportRecord>,
    /// Segments whose file could not be written.
    pub failures: Vec<ExportFailure>,
}

impl ExportOutcome {
    /// Number of files written.
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// Writes one single-page PDF per segment into a destination directory.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create an exporter.
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Export the last page of every segment.
    ///
    /// `base_name` is the source file stem. A failing segment is recorded and
    /// the remaining segments are still written. The destination must exist.
    pub fn export<W: PageWriter + ?Sized>(
        &self,
        source: &W,
        base_name: &str,
        segments: &[Segment],
        destination: &Path,
    ) -> Result<ExportOutcome> {
        if !destination.is_dir() {
            return Err(ExportError::Destination(destination.to_path_buf()));
        }

        let mut ordered: Vec<&Segment> = segments.iter().collect();
        ordered.sort_by_key(|s| s.discovery_order);

        let mut outcome = ExportOutcome::default();
        let mut used: HashSet<String> = HashSet::new();

        for segment in ordered {
            let path = self.free_path(destination, segment, base_name, &used);

            match source.write_page(segment.last_page, &path) {
                Ok(()) => {
                    used.insert(path.to_string_lossy().to_lowercase());
                    info!(
                        "Exported last page of {} (page {}) -> {}",
                        segment.identifier,
                        segment.last_page + 1,
                        path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default()
                    );
                    outcome.records.push(ExportRecord {
                        segment: segment.clone(),
                        output_path: path,
                    });
                }
                Err(e) => {
                    let error = ExportError::Write {
                        path: path.clone(),
                        reason: e.to_string(),
                    };
                    warn!("{}", error);
                    outcome.failures.push(ExportFailure {
                        segment: segment.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Output file name for a segment, before collision handling.
    pub fn file_name(&self, segment: &Segment, base_name: &str, attempt: u32) -> String {
        let safe_id = safe_name(
            segment.identifier.as_str(),
            &self.config.placeholder,
            self.config.max_name_len,
        );
        let collision = if attempt == 0 {
            String::new()
        } else {
            format!("_{}", attempt)
        };

        format!(
            "{:03}_{}__{}{}{}.pdf",
            segment.discovery_order, safe_id, base_name, self.config.suffix, collision
        )
    }

    fn free_path(&self, destination: &Path, segment: &Segment, base_name: &str, used: &HashSet<String>) -> PathBuf {
        let mut attempt = 0;
        loop {
            let path = destination.join(self.file_name(segment, base_name, attempt));
            if !used.contains(&path.to_string_lossy().to_lowercase()) && !path.exists() {
                return path;
            }
            attempt += 1;
        }
    }
}

/// Make a string safe for use in a file name.
///
/// Runs of characters outside `A-Za-z0-9-_.` become `_`, surrounding `_` are
/// trimmed, an empty result becomes `placeholder`, and the result is cut to
/// `max_len` characters.
pub fn safe_name(raw: &str, placeholder: &str, max_len: usize) -> String {
    let replaced = UNSAFE_FILENAME_RUN.replace_all(raw, "_");
    let trimmed = replaced.trim_matches('_');
    let name = if trimmed.is_empty() { placeholder } else { trimmed };
    name.chars().take(max_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::models::segment::InvoiceId;
    use std::cell::RefCell;

    /// Writes a marker file per page and remembers what it wrote.
    #[derive(Default)]
    struct RecordingWriter {
        fail_on: Option<usize>,
        written: RefCell<Vec<(usize, PathBuf)>>,
    }

    impl PageWriter for RecordingWriter {
        fn write_page(&self, index: usize, path: &Path) -> crate::pdf::Result<()> {
            if self.fail_on == Some(index) {
                return Err(PdfError::Save("disk full".to_string()));
            }
            std::fs::write(path, format!("page {}", index)).map_err(|e| PdfError::Save(e.to_string()))?;
            self.written.borrow_mut().push((index, path.to_path_buf()));
            Ok(())
        }
    }

    fn segment(id: &str, last: usize, order: u32) -> Segment {
        Segment {
            identifier: InvoiceId::normalize(id).unwrap(),
            first_page: 0,
            last_page: last,
            discovery_order: order,
            reappeared: false,
        }
    }

    fn names(outcome: &ExportOutcome) -> Vec<String> {
        outcome
            .records
            .iter()
            .map(|r| r.output_path.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("D2414318", "factura", 120), "D2414318");
        assert_eq!(safe_name("2024/0815", "factura", 120), "2024_0815");
        assert_eq!(safe_name("//A  B//", "factura", 120), "A_B");
        assert_eq!(safe_name("ÑÑ", "factura", 120), "factura");
        assert_eq!(safe_name("ABCDEFGH", "factura", 3), "ABC");
    }

    #[test]
    fn test_file_name_format() {
        let exporter = Exporter::default();
        let seg = segment("D2414318", 4, 7);
        assert_eq!(exporter.file_name(&seg, "lote_enero", 0), "007_D2414318__lote_enero_ULTIMA.pdf");
        assert_eq!(exporter.file_name(&seg, "lote_enero", 2), "007_D2414318__lote_enero_ULTIMA_2.pdf");
    }

    #[test]
    fn test_exports_last_pages_in_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordingWriter::default();
        let segments = vec![segment("B2", 5, 2), segment("A1", 1, 1)];

        let outcome = Exporter::default()
            .export(&writer, "src", &segments, dir.path())
            .unwrap();

        assert_eq!(outcome.count(), 2);
        assert_eq!(names(&outcome), vec!["001_A1__src_ULTIMA.pdf", "002_B2__src_ULTIMA.pdf"]);
        let pages: Vec<usize> = writer.written.borrow().iter().map(|(i, _)| *i).collect();
        assert_eq!(pages, vec![1, 5]);
    }

    #[test]
    fn test_colliding_names_get_numeric_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordingWriter::default();
        // Both identifiers collapse to the placeholder with the same order
        let segments = vec![segment("%%%", 0, 1), segment("@@@", 1, 1)];

        let outcome = Exporter::default()
            .export(&writer, "src", &segments, dir.path())
            .unwrap();

        assert_eq!(
            names(&outcome),
            vec!["001_factura__src_ULTIMA.pdf", "001_factura__src_ULTIMA_1.pdf"]
        );
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("001_A1__src_ULTIMA.pdf"), "previous run").unwrap();

        let outcome = Exporter::default()
            .export(&RecordingWriter::default(), "src", &[segment("A1", 0, 1)], dir.path())
            .unwrap();

        assert_eq!(names(&outcome), vec!["001_A1__src_ULTIMA_1.pdf"]);
        let previous = std::fs::read_to_string(dir.path().join("001_A1__src_ULTIMA.pdf")).unwrap();
        assert_eq!(previous, "previous run");
    }

    #[test]
    fn test_write_failure_does_not_stop_other_segments() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordingWriter {
            fail_on: Some(1),
            ..Default::default()
        };
        let segments = vec![segment("A1", 1, 1), segment("B2", 3, 2)];

        let outcome = Exporter::default()
            .export(&writer, "src", &segments, dir.path())
            .unwrap();

        assert_eq!(outcome.count(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].segment.identifier.as_str(), "A1");
        assert!(outcome.failures[0].reason.contains("disk full"));
    }

    #[test]
    fn test_missing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = Exporter::default()
            .export(&RecordingWriter::default(), "src", &[segment("A1", 0, 1)], &missing)
            .unwrap_err();
        assert!(matches!(err, ExportError::Destination(_)));
        assert!(!missing.exists());
    }

    #[test]
    fn test_custom_suffix() {
        let exporter = Exporter::new(ExportConfig {
            suffix: "_LAST".to_string(),
            ..ExportConfig::default()
        });
        assert_eq!(exporter.file_name(&segment("A1", 0, 12), "x", 0), "012_A1__x_LAST.pdf");
    }
}
