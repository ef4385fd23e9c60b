//! Load-time errors. Any of these prevents the service from starting.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: missing range bound field")]
    MissingBound { line: usize },
    #[error("line {line}: invalid {field} bound {value:?}")]
    InvalidBound {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: range start {from} is greater than range end {to}")]
    InvertedBounds { line: usize, from: u32, to: u32 },
}
