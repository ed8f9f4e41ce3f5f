//! Error types for the report pipeline.

use thiserror::Error;

/// Report pipeline errors.
///
/// `MalformedRecord` is recovered per record (drop, count, log);
/// `InsufficientData` is terminal for the statistic that raised it, and the
/// caller decides whether that kills the run or just leaves a report
/// section unfilled.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("API error: {0}")]
    Api(#[from] otf_client::OtfError),

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pipeline operations.
pub type ReportResult<T> = Result<T, ReportError>;
