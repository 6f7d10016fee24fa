use std::path::PathBuf;
use thiserror::Error;

use crate::models::YearMonth;

/// All errors produced by the cohort retention crates.
#[derive(Error, Debug)]
pub enum CohortError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV record could not be read.
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A field of a transaction row could not be parsed into its typed value.
    #[error("Failed to parse {field} {value:?} at {file}:{line}")]
    Parse {
        file: String,
        line: u64,
        field: &'static str,
        value: String,
    },

    /// A period label did not match `YYYY-MM`.
    #[error("Invalid period label: {0}")]
    InvalidLabel(String),

    /// A required column is absent from the input header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// User-supplied query parameters were rejected before any computation.
    #[error("{0}")]
    InvalidInput(String),

    /// A cohort had no customers at offset zero, so its row cannot be normalized.
    #[error("Cohort {cohort} has zero customers at offset 0")]
    ZeroCohortSize { cohort: String },

    /// A transaction referenced a period that the period index does not know.
    #[error("Period {0} is not present in the period index")]
    UnknownPeriod(YearMonth),

    /// The expected data path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No CSV files were found under the given directory.
    #[error("No CSV files found in {0}")]
    NoDataFiles(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CohortError {
    /// `true` for errors the user can fix by changing the input or the
    /// data file, as opposed to internal failures.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            CohortError::InvalidInput(_)
                | CohortError::Parse { .. }
                | CohortError::MissingColumn(_)
                | CohortError::InvalidLabel(_)
                | CohortError::DataPathNotFound(_)
                | CohortError::NoDataFiles(_)
                | CohortError::Config(_)
        )
    }
}

/// Convenience alias used throughout the cohort crates.
pub type Result<T> = std::result::Result<T, CohortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = CohortError::FileRead {
            path: PathBuf::from("/data/retail.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/retail.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_parse() {
        let err = CohortError::Parse {
            file: "retail.csv".to_string(),
            line: 12,
            field: "date",
            value: "yesterday".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to parse date \"yesterday\" at retail.csv:12");
    }

    #[test]
    fn test_error_display_invalid_input_is_verbatim() {
        let err = CohortError::InvalidInput("Invalid input: cohort year must be an integer".into());
        assert_eq!(err.to_string(), "Invalid input: cohort year must be an integer");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_error_display_zero_cohort() {
        let err = CohortError::ZeroCohortSize {
            cohort: "2010-01".to_string(),
        };
        assert_eq!(err.to_string(), "Cohort 2010-01 has zero customers at offset 0");
        assert!(!err.is_user_facing());
    }

    #[test]
    fn test_error_display_unknown_period() {
        let err = CohortError::UnknownPeriod(YearMonth::new(2011, 3).unwrap());
        assert_eq!(err.to_string(), "Period 2011-03 is not present in the period index");
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = CohortError::MissingColumn("country".to_string());
        assert_eq!(err.to_string(), "Missing required column: country");
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_error_display_no_data_files() {
        let err = CohortError::NoDataFiles(PathBuf::from("/empty/dir"));
        assert_eq!(err.to_string(), "No CSV files found in /empty/dir");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CohortError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
