// ============================================================
// Layer 3 - Error Type
// ============================================================
// Every failure the library can surface to a caller.
// Library code returns Result<T, WganError>; the application
// and CLI layers wrap it in anyhow with extra context.
//
// None of these are retried. A failure ends the current run.

use thiserror::Error;

/// Convenience alias used throughout the library layers
pub type Result<T> = std::result::Result<T, WganError>;

#[derive(Debug, Error)]
pub enum WganError {
    /// A variable named in the feature specification is absent from a table
    #[error("missing variable '{0}' in input table")]
    MissingVariable(String),

    /// A continuous or context variable holds text values
    #[error("variable '{0}' must be numeric")]
    NonNumericVariable(String),

    /// A categorical value that was not seen when the specification was built
    #[error("variable '{variable}' has level '{level}' not present in the reference data")]
    UnknownLevel { variable: String, level: String },

    #[error("reference table has no rows")]
    EmptyTable,

    #[error("column '{column}' has {found} rows, expected {expected}")]
    ColumnLength { column: String, expected: usize, found: usize },

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),

    /// A bound was supplied for a name that is not a continuous variable
    #[error("bound given for '{0}', which is not a continuous variable")]
    UnknownBoundVariable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported optimizer '{0}' (expected \"Adam\" or \"AdamHD\")")]
    UnsupportedOptimizer(String),

    #[error("unsupported interpolation sampling '{0}' (expected \"normal\" or \"uniform\")")]
    UnsupportedInterpolation(String),

    /// Saved weights do not fit the network built from the current configuration
    #[error("{network} architecture mismatch: expected layers {expected:?}, checkpoint has {found:?}")]
    ArchitectureMismatch {
        network: &'static str,
        expected: Vec<[usize; 2]>,
        found: Vec<[usize; 2]>,
    },

    #[error("checkpoint was written with optimizer {found}, configuration asks for {expected}")]
    OptimizerMismatch { expected: String, found: String },

    /// A categorical block cannot be read as a probability distribution
    #[error("categorical block for '{0}' is not a valid probability distribution")]
    InvalidProbabilities(String),

    #[error("{what} width mismatch: expected {expected}, found {found}")]
    WidthMismatch { what: &'static str, expected: usize, found: usize },

    #[error("test set of {test} rows leaves no training rows out of {total}")]
    TestSplitTooLarge { test: usize, total: usize },

    /// burn recorder failures (serialising or restoring module/optimizer records)
    #[error("record error: {0}")]
    Record(String),

    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<bincode::Error> for WganError {
    fn from(e: bincode::Error) -> Self {
        WganError::Checkpoint(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_names_the_column() {
        let e = WganError::MissingVariable("re78".into());
        assert!(e.to_string().contains("re78"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e: WganError = io.into();
        assert!(matches!(e, WganError::Io(_)));
    }
}
