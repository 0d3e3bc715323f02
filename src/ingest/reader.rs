//! Line-by-line reader for a single export file.

use crate::error::{FormatProblem, IngestError, ValueParseError};
use crate::models::{FileReport, MonthlyValues};
use crate::scanner::ScannedFile;
use chrono::NaiveDate;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use tracing::{debug, warn};

/// Header literals and censoring rules of the export format.
#[derive(Debug, Clone)]
pub struct CsvFormat {
    /// Exact first line, compared after trimming.
    pub category_line: String,
    /// Prefix of the column header line, compared case-insensitively.
    pub header_prefix: String,
    /// Value cells starting with this are censored.
    pub censored_prefix: String,
    /// Value used for censored cells.
    pub censored_value: f64,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            category_line: "Category: All categories".to_string(),
            header_prefix: "month,".to_string(),
            censored_prefix: "<".to_string(),
            censored_value: 0.0,
        }
    }
}

impl From<&crate::config::FormatConfig> for CsvFormat {
    fn from(config: &crate::config::FormatConfig) -> Self {
        Self {
            category_line: config.category_line.clone(),
            header_prefix: config.header_prefix.clone(),
            censored_prefix: config.censored_prefix.clone(),
            censored_value: config.censored_value,
        }
    }
}

/// Outcome of parsing one data row.
#[derive(Debug, Clone, PartialEq)]
enum Row {
    Value { month: String, value: f64, censored: bool },
    Malformed,
    BadValue(ValueParseError),
}

/// Reads export files into a [`MonthlyValues`] mapping.
pub struct CsvIngestor {
    format: CsvFormat,
}

impl CsvIngestor {
    pub fn new(format: CsvFormat) -> Self {
        Self { format }
    }

    /// Read one file from disk.
    ///
    /// Rows are accumulated as they are read, so on a read error `report`
    /// and `values` keep what was read before the failure.
    pub fn ingest_file(
        &self,
        file: &ScannedFile,
        values: &mut MonthlyValues,
        report: &mut FileReport,
    ) -> Result<(), IngestError> {
        let handle = File::open(&file.path).map_err(|source| IngestError::Io {
            file: file.name.clone(),
            source,
        })?;

        self.ingest_reader(&file.name, BufReader::new(handle), values, report)
    }

    /// Read one export from any buffered source. `name` is used in messages.
    pub fn ingest_reader<R: BufRead>(
        &self,
        name: &str,
        reader: R,
        values: &mut MonthlyValues,
        report: &mut FileReport,
    ) -> Result<(), IngestError> {
        let io_err = |source| IngestError::Io {
            file: name.to_string(),
            source,
        };
        let format_err = |reason| IngestError::Format {
            file: name.to_string(),
            reason,
        };

        let mut lines = LossyLines::new(reader);

        let category = lines.next().transpose().map_err(io_err)?;
        if category.as_deref().map(str::trim) != Some(self.format.category_line.as_str()) {
            return Err(format_err(FormatProblem::CategoryLine));
        }

        let separator = lines.next().transpose().map_err(io_err)?;
        if !separator.is_some_and(|l| l.trim().is_empty()) {
            return Err(format_err(FormatProblem::SeparatorLine));
        }

        let header = lines.next().transpose().map_err(io_err)?;
        let prefix = self.format.header_prefix.to_lowercase();
        if !header.is_some_and(|l| l.trim().to_lowercase().starts_with(&prefix)) {
            return Err(format_err(FormatProblem::HeaderLine));
        }

        for line in lines {
            let line = line.map_err(io_err)?;

            match self.parse_row(name, &line) {
                Row::Value {
                    month,
                    value,
                    censored,
                } => {
                    if !is_month_key(&month) {
                        debug!("{}: '{}' is not a YYYY-MM month key", name, month);
                    }
                    values.accumulate(&month, value);
                    report.rows_accepted += 1;
                    if censored {
                        report.censored += 1;
                    }
                }
                Row::Malformed => {
                    debug!("{}: skipping row '{}'", name, line);
                    report.rows_skipped += 1;
                }
                Row::BadValue(err) => {
                    warn!("{}", err);
                    report.value_errors += 1;
                }
            }
        }

        debug!(
            "{}: {} rows accepted, {} skipped, {} invalid values",
            name, report.rows_accepted, report.rows_skipped, report.value_errors
        );

        Ok(())
    }

    fn parse_row(&self, name: &str, line: &str) -> Row {
        let fields = split_fields(line.trim());
        if fields.len() != 2 {
            return Row::Malformed;
        }

        let month = fields[0].trim();
        let raw = fields[1].trim();

        if raw.starts_with(self.format.censored_prefix.as_str()) {
            return Row::Value {
                month: month.to_string(),
                value: self.format.censored_value,
                censored: true,
            };
        }

        match parse_value(raw) {
            Some(value) => Row::Value {
                month: month.to_string(),
                value,
                censored: false,
            },
            None => Row::BadValue(ValueParseError {
                file: name.to_string(),
                month: month.to_string(),
                raw: raw.to_string(),
            }),
        }
    }
}

/// Lines decoded lossily: invalid UTF-8 becomes U+FFFD rather than an
/// error, so only real read failures surface as `Err`.
struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Parse a numeric cell. `inf`, `infinity` and `nan` spelled out are
/// rejected; an exponent that overflows still yields infinity.
fn parse_value(raw: &str) -> Option<f64> {
    let value = raw.parse::<f64>().ok()?;
    let spelled_out = raw
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && !b.eq_ignore_ascii_case(&b'e'));
    if !value.is_finite() && spelled_out {
        return None;
    }
    Some(value)
}

/// Split on commas, dropping trailing empty fields.
fn split_fields(line: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(',').collect();
    while fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    fields
}

fn is_month_key(month: &str) -> bool {
    NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").is_ok() && month.len() == 7
}
