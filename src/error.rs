use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the I/O edges of the crate. Parsing itself never errors:
/// a document either yields a result or is rejected.
#[derive(Debug, Error)]
pub enum SphaError {
    #[error("Cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed JSON that lacks `resultHierarchy`, `origins` or `projectInfo`.
    #[error("'{}' is not a health report (missing resultHierarchy, origins or projectInfo)", path.display())]
    Rejected { path: PathBuf },

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Output(String),
}

impl SphaError {
    /// True when the file was readable JSON but not a report.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SphaError::Rejected { .. })
    }
}

pub type Result<T> = std::result::Result<T, SphaError>;
