use reportgen_core::models::report::ReportStatus;
use reportgen_notify::error::NotifyError;
use reportgen_storage::error::{StorageError, UploadError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unsupported report type: {0:?}")]
    UnsupportedReportType(String),

    #[error("report generation failed: {0}")]
    Generation(String),

    #[error("report not found: {0}")]
    NotFound(String),

    #[error("report {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: ReportStatus,
        to: ReportStatus,
    },

    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),
}

impl EngineError {
    /// Whether the failure came from infrastructure that may recover, so
    /// redelivering the message could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::Generation(_)
                | EngineError::Storage(_)
                | EngineError::Upload(_)
                | EngineError::Notify(_)
        )
    }
}

impl From<StorageError> for EngineError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::ReportNotFound { id } => EngineError::NotFound(id),
            other => EngineError::Storage(other),
        }
    }
}
