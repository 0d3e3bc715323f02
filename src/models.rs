//! Data models for monthly aggregation and scoring.
//!
//! This module contains the ordered month mapping that all CSV files are
//! merged into, the scoring result, and the ingestion counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summed value per month-key, iterated in ascending key order.
///
/// Month keys are `YYYY-MM` strings, so lexical order is chronological.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlyValues {
    values: BTreeMap<String, f64>,
}

impl MonthlyValues {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the running sum for `month`, inserting it if absent.
    pub fn accumulate(&mut self, month: &str, value: f64) {
        *self.values.entry(month.to_string()).or_insert(0.0) += value;
    }

    /// Returns the summed value for a month.
    #[cfg(test)]
    pub fn get(&self, month: &str) -> Option<f64> {
        self.values.get(month).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(month, value)` pairs in chronological order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Splits into the latest month and the values of every earlier month.
    ///
    /// Returns `None` when the mapping is empty.
    pub fn split_latest(&self) -> Option<((&str, f64), Vec<f64>)> {
        let (latest, current) = self.values.iter().next_back()?;
        let historical = self
            .values
            .values()
            .take(self.values.len() - 1)
            .copied()
            .collect();
        Some(((latest.as_str(), *current), historical))
    }
}

/// Successful z-score of the latest month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreResult {
    /// Month-key of the latest month.
    pub latest_month: String,
    /// Summed value of the latest month.
    pub current_value: f64,
    /// Population mean of the earlier months.
    pub historical_mean: f64,
    /// Population standard deviation of the earlier months.
    pub historical_std_dev: f64,
    /// Number of earlier months.
    pub history_len: usize,
    /// `(historical_mean - current_value) / historical_std_dev`.
    pub z_score: f64,
}

/// Counters for a single CSV file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Rows accumulated into the month mapping.
    pub rows_accepted: usize,
    /// Rows that did not split into exactly two fields.
    pub rows_skipped: usize,
    /// Rows with an unparseable value cell.
    pub value_errors: usize,
    /// Accepted rows whose value was censored (`<1`).
    pub censored: usize,
}

/// Run-wide ingestion totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub files_found: usize,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub rows_accepted: usize,
    pub rows_skipped: usize,
    pub value_errors: usize,
    pub censored: usize,
}

impl IngestSummary {
    /// Adds the counters of a file that was read to the end.
    pub fn record_file(&mut self, report: &FileReport) {
        self.files_processed += 1;
        self.add_rows(report);
    }

    /// Records a file that was rejected or failed to read. Rows it
    /// contributed before failing are still counted.
    pub fn record_skipped(&mut self, partial: &FileReport) {
        self.files_skipped += 1;
        self.add_rows(partial);
    }

    /// Whether any file or row was dropped along the way.
    pub fn had_problems(&self) -> bool {
        self.files_skipped > 0 || self.value_errors > 0
    }

    fn add_rows(&mut self, report: &FileReport) {
        self.rows_accepted += report.rows_accepted;
        self.rows_skipped += report.rows_skipped;
        self.value_errors += report.value_errors;
        self.censored += report.censored;
    }
}

/// Everything printed for a successful run in JSON mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// When the score was computed.
    pub generated_at: DateTime<Utc>,
    /// Directory the CSV files were read from.
    pub data_dir: String,
    pub result: ZScoreResult,
    pub ingest: IngestSummary,
    /// Month-by-month sums the score was computed from.
    pub monthly_values: MonthlyValues,
}
