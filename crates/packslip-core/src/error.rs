//! Error taxonomy for packslip runs.

/// Errors produced while converting a packing slip to a printable format.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("converter executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("converter exited with code {exit_code}: {stderr}")]
    Failed { exit_code: i32, stderr: String },

    #[error("converter timed out after {0} seconds")]
    TimedOut(u64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// packslip run errors.
#[derive(Debug, thiserror::Error)]
pub enum PackslipError {
    #[error("ledger is missing required column: {column}")]
    SchemaMismatch { column: String },

    #[error("ledger row {line}: {reason}")]
    InvalidRow { line: u64, reason: String },

    #[error("{count} committed row(s) have no classification tag (first: package {first_package})")]
    ClassificationGaps { count: usize, first_package: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for packslip operations.
pub type Result<T> = std::result::Result<T, PackslipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_display() {
        let err = PackslipError::SchemaMismatch {
            column: "Tags".to_string(),
        };
        assert_eq!(err.to_string(), "ledger is missing required column: Tags");
    }

    #[test]
    fn test_classification_gaps_display() {
        let err = PackslipError::ClassificationGaps {
            count: 2,
            first_package: "P7".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2 committed row(s)"));
        assert!(msg.contains("P7"));
    }

    #[test]
    fn test_convert_failed_display() {
        let err = ConvertError::Failed {
            exit_code: 1,
            stderr: "Exit with code 1 due to network error".to_string(),
        };
        assert!(err.to_string().contains("exited with code 1"));
    }

    #[test]
    fn test_io_error_from() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PackslipError = io.into();
        assert!(matches!(err, PackslipError::Io(_)));
    }
}
