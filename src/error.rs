//! Error types for the dashboard core.

use thiserror::Error;

/// Top-level error type for loading, querying and exporting delivery data.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Missing or unreadable source, missing column, or a value that does not parse.
    #[error("data format error: {0}")]
    DataFormat(String),

    #[error("unsupported grouping `{0}` (expected Daily, Weekly, Monthly or Quarterly)")]
    UnsupportedGrouping(String),

    #[error("unsupported metric `{0}`")]
    UnsupportedMetric(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn data_format(msg: impl Into<String>) -> Self {
        Self::DataFormat(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
