//! CSV ingestion.
//!
//! Validates the three-line Google Trends export header and folds each
//! `month,value` row into the shared [`MonthlyValues`]. A file that fails
//! validation or cannot be read is reported and skipped; the rest of the
//! set is still aggregated.

pub mod reader;

pub use reader::{CsvFormat, CsvIngestor};

use crate::models::{FileReport, IngestSummary, MonthlyValues};
use crate::scanner::ScannedFile;
use tracing::{info, warn};

/// Read every file in order, summing values that share a month.
pub fn aggregate_files(
    files: &[ScannedFile],
    ingestor: &CsvIngestor,
) -> (MonthlyValues, IngestSummary) {
    let mut values = MonthlyValues::new();
    let mut summary = IngestSummary {
        files_found: files.len(),
        ..Default::default()
    };

    for file in files {
        let mut report = FileReport::default();

        match ingestor.ingest_file(file, &mut values, &mut report) {
            Ok(()) => summary.record_file(&report),
            Err(e) => {
                warn!("{}", e);
                summary.record_skipped(&report);
            }
        }
    }

    let message = format!(
        "Read {} of {} files ({} skipped): {} rows used, {} malformed, {} invalid values, {} months",
        summary.files_processed,
        summary.files_found,
        summary.files_skipped,
        summary.rows_accepted,
        summary.rows_skipped,
        summary.value_errors,
        values.len()
    );
    if summary.had_problems() {
        warn!("{}", message);
    } else {
        info!("{}", message);
    }

    (values, summary)
}
