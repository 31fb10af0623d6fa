use std::io;
use thiserror::Error;

/// Errors raised while loading or splitting a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Low-level IO failures while reading the source file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// A row could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    /// A row carries the wrong number of columns.
    #[error("line {line}: expected {expected} columns, found {found}")]
    ShapeMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    /// The source contained no data rows.
    #[error("dataset contains no samples")]
    EmptyDataset,
    /// Diagnosis column held something other than `M` or `B`.
    #[error("line {line}: unknown diagnosis {value:?}")]
    UnknownDiagnosis { line: usize, value: String },
    /// Feature matrix, targets and names disagree on shape.
    #[error("inconsistent dataset: {0}")]
    Inconsistent(String),
    /// Split parameters would leave one side empty.
    #[error("invalid split: {0}")]
    InvalidSplit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_mentions_line() {
        let err = DatasetError::Parse {
            line: 7,
            message: "bad float".into(),
        };
        assert!(err.to_string().contains("line 7"));
        assert!(err.to_string().contains("bad float"));
    }

    #[test]
    fn shape_mismatch_formatting() {
        let err = DatasetError::ShapeMismatch {
            line: 2,
            expected: 32,
            found: 5,
        };
        assert_eq!(err.to_string(), "line 2: expected 32 columns, found 5");
    }

    #[test]
    fn error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "wdbc.data");
        let err: DatasetError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }
}
