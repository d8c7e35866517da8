//! Error types for the salvia search engine.

use thiserror::Error;

/// The error type for all fallible salvia operations.
#[derive(Error, Debug)]
pub enum SalviaError {
    /// The index store could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document field could not be analyzed. The offending document is
    /// skipped and reported; the build continues.
    #[error("analysis error: {0}")]
    Analysis(String),

    /// The query text could not be parsed. Nothing is searched.
    #[error("query syntax error: {0}")]
    QuerySyntax(String),

    /// The persisted index was written by an incompatible engine version.
    #[error("index version mismatch: expected format {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    /// The persisted index failed a structural or checksum validation.
    #[error("corrupt index: {0}")]
    Corrupt(String),

    /// An index-level invariant was violated by the caller or the store.
    #[error("index error: {0}")]
    Index(String),
}

impl SalviaError {
    /// Create an analysis error.
    pub fn analysis<S: Into<String>>(message: S) -> Self {
        SalviaError::Analysis(message.into())
    }

    /// Create a query syntax error.
    pub fn query<S: Into<String>>(message: S) -> Self {
        SalviaError::QuerySyntax(message.into())
    }

    /// Create a corrupt-index error.
    pub fn corrupt<S: Into<String>>(message: S) -> Self {
        SalviaError::Corrupt(message.into())
    }

    /// Create an index error.
    pub fn index<S: Into<String>>(message: S) -> Self {
        SalviaError::Index(message.into())
    }
}

/// A specialized `Result` type for salvia operations.
pub type Result<T> = std::result::Result<T, SalviaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SalviaError::query("unbalanced quote in 'foo\"'");
        assert_eq!(
            err.to_string(),
            "query syntax error: unbalanced quote in 'foo\"'"
        );

        let err = SalviaError::VersionMismatch {
            expected: 1,
            found: 7,
        };
        assert_eq!(
            err.to_string(),
            "index version mismatch: expected format 1, found 7"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SalviaError = io_err.into();
        assert!(matches!(err, SalviaError::Io(_)));
    }
}
