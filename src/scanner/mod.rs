//! File scanner for discovering CSV exports.
//!
//! Only the top level of the data directory is listed; files are matched
//! by extension, ignoring case, and returned in file name order.

use crate::error::DirectoryError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Configuration for file scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Extension to match, without the dot (compared case-insensitively)
    pub extension: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extension: "csv".to_string(),
        }
    }
}

impl From<&crate::config::InputConfig> for ScanConfig {
    fn from(config: &crate::config::InputConfig) -> Self {
        Self {
            extension: config.extension.clone(),
        }
    }
}

/// Scanned file information.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File name, used in messages
    pub name: String,
    /// File size in bytes
    pub size: u64,
}

/// File scanner for the data directory.
pub struct FileScanner {
    config: ScanConfig,
    data_dir: PathBuf,
}

impl FileScanner {
    /// Create a new file scanner.
    pub fn new(data_dir: PathBuf, config: ScanConfig) -> Self {
        Self { config, data_dir }
    }

    /// Returns the directory being scanned.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// List matching files, failing when there are none.
    pub fn scan(&self) -> Result<Vec<ScannedFile>, DirectoryError> {
        if !self.data_dir.is_dir() {
            return Err(DirectoryError::DataDirMissing(self.data_dir.clone()));
        }

        let mut files = Vec::new();

        let walker = WalkDir::new(&self.data_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|source| DirectoryError::Listing {
                path: self.data_dir.clone(),
                source,
            })?;

            // Follows symlinks; a dangling link is not a file.
            if !entry.path().is_file() || !self.matches(entry.path()) {
                continue;
            }

            let size = std::fs::metadata(entry.path()).map(|m| m.len()).unwrap_or(0);
            let name = entry.file_name().to_string_lossy().to_string();
            debug!("Found {} ({} bytes)", name, size);

            files.push(ScannedFile {
                path: entry.into_path(),
                name,
                size,
            });
        }

        if files.is_empty() {
            return Err(DirectoryError::NoCsvFiles(self.data_dir.clone()));
        }

        Ok(files)
    }

    /// Check if a path has the configured extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.config.extension))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn scanner_for(dir: &TempDir) -> FileScanner {
        FileScanner::new(dir.path().to_path_buf(), ScanConfig::default())
    }

    #[test]
    fn test_scan_matches_extension_case_insensitively() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.CSV"), "x").unwrap();
        fs::write(dir.path().join("a.csv"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = scanner_for(&dir).scan().unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["a.csv", "b.CSV"]);
    }

    #[test]
    fn test_scan_is_not_recursive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.csv"), "x").unwrap();
        fs::write(dir.path().join("top.csv"), "x").unwrap();

        let files = scanner_for(&dir).scan().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "top.csv");
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_follows_symlinks() {
        let dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let target = elsewhere.path().join("shared.csv");
        fs::write(&target, "x").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("linked.csv")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling.csv"))
            .unwrap();

        let files = scanner_for(&dir).scan().unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "linked.csv");
        assert_eq!(files[0].size, 1);
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("readme.md"), "x").unwrap();

        let err = scanner_for(&dir).scan().unwrap_err();
        assert!(matches!(err, DirectoryError::NoCsvFiles(_)));
    }

    #[test]
    fn test_scan_missing_directory() {
        let dir = TempDir::new().unwrap();
        let scanner = FileScanner::new(dir.path().join("Data"), ScanConfig::default());

        let err = scanner.scan().unwrap_err();
        assert!(matches!(err, DirectoryError::DataDirMissing(_)));
    }

    #[test]
    fn test_matches() {
        let scanner = FileScanner::new(PathBuf::from("."), ScanConfig::default());
        assert!(scanner.matches(Path::new("trends.csv")));
        assert!(scanner.matches(Path::new("TRENDS.Csv")));
        assert!(!scanner.matches(Path::new("trends.csv.bak")));
        assert!(!scanner.matches(Path::new("csv")));
    }
}
