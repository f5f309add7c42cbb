//! Error type for file-level operations.
//!
//! Parsing and expansion never fail; errors only arise when reading inputs
//! or writing CSV output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading feature files or writing sheets.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Reading or walking a path failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SheetError {
    /// Wrap an I/O error with the path it concerns.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_the_path() {
        let error = SheetError::io(
            "features/missing.feature",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(
            error.to_string(),
            "I/O error at features/missing.feature: not found"
        );
    }
}
