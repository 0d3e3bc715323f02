//! Error types for ingestion and scoring.
//!
//! File- and row-level errors are reported and skipped; the analysis errors
//! end the run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors locating the input files.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The data directory does not exist or is not a directory.
    #[error("Data directory not found: {0}")]
    DataDirMissing(PathBuf),

    /// The data directory holds no CSV files.
    #[error("No CSV files found in {0}")]
    NoCsvFiles(PathBuf),

    /// The directory listing itself failed.
    #[error("Failed to list {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Errors that cause a single CSV file to be skipped.
#[derive(Error, Debug)]
pub enum IngestError {
    /// One of the three header lines is missing or wrong.
    #[error("Invalid format in {file}: {reason}")]
    Format { file: String, reason: FormatProblem },

    /// The file could not be opened or a read failed part way.
    #[error("Error reading {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which header line failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatProblem {
    CategoryLine,
    SeparatorLine,
    HeaderLine,
}

impl std::fmt::Display for FormatProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatProblem::CategoryLine => write!(f, "Missing or incorrect category line."),
            FormatProblem::SeparatorLine => {
                write!(f, "Expected an empty line after category.")
            }
            FormatProblem::HeaderLine => write!(
                f,
                "Missing or incorrect header line. Expected 'Month,' at the start."
            ),
        }
    }
}

/// A data row whose value cell is not a number. The row is skipped.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid value in {file} for month {month}: {raw}")]
pub struct ValueParseError {
    pub file: String,
    pub month: String,
    pub raw: String,
}

/// Terminal errors of the z-score computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("No data aggregated from CSV files")]
    NoData,

    #[error("Insufficient historical data to compute Z-score")]
    InsufficientHistory,

    #[error("Historical standard deviation is zero; cannot compute Z-score")]
    ZeroVariance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_no_csv_files() {
        let err = DirectoryError::NoCsvFiles(PathBuf::from("/empty/Data"));
        assert_eq!(err.to_string(), "No CSV files found in /empty/Data");
    }

    #[test]
    fn test_error_display_format() {
        let err = IngestError::Format {
            file: "multiTimeline.csv".to_string(),
            reason: FormatProblem::SeparatorLine,
        };
        assert_eq!(
            err.to_string(),
            "Invalid format in multiTimeline.csv: Expected an empty line after category."
        );
    }

    #[test]
    fn test_error_display_io() {
        let err = IngestError::Io {
            file: "a.csv".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Error reading a.csv"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_display_value_parse() {
        let err = ValueParseError {
            file: "a.csv".to_string(),
            month: "2023-01".to_string(),
            raw: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value in a.csv for month 2023-01: abc"
        );
    }

    #[test]
    fn test_analysis_errors_are_distinct() {
        assert_ne!(
            AnalysisError::NoData.to_string(),
            AnalysisError::InsufficientHistory.to_string()
        );
        assert!(AnalysisError::ZeroVariance
            .to_string()
            .contains("standard deviation is zero"));
    }
}
