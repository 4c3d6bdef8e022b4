use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("unknown report type: {0}")]
    UnknownReportType(String),

    #[error("report generation failed: {0}")]
    Generation(String),
}
