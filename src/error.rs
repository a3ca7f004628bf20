use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at the edges of the pipeline: reading OCR dumps, loading
/// configuration, and validating finished examples. Extraction itself is
/// best-effort and never fails.
#[derive(Error, Debug)]
pub enum LabOcrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OCR TSV is missing the `{0}` column")]
    MissingColumn(&'static str),

    #[error("OCR TSV row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Example {id}: {tokens} tokens but {bboxes} boxes")]
    TokenBoxMismatch {
        id: String,
        tokens: usize,
        bboxes: usize,
    },

    #[error("Example {id}: answer span {start}..={end} outside {len} tokens")]
    SpanOutOfRange {
        id: String,
        start: usize,
        end: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, LabOcrError>;
