//! Error types for the saenggibu library.

use std::io;
use thiserror::Error;

/// Result type alias for saenggibu operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading documents or emitting reports.
///
/// Extraction itself never fails: malformed pages, tables, rows and cells
/// degrade to empty or partial output. Only opening and decoding a document
/// source, filesystem I/O, and JSON (de)serialization surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error decoding or encoding JSON (page dumps, reports).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document source cannot be opened or is structurally unusable.
    #[error("Document source error: {0}")]
    Source(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Source("page dump has no pages".to_string());
        assert_eq!(
            err.to_string(),
            "Document source error: page dump has no pages"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
