use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("report not found: {id}")]
    ReportNotFound { id: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("S3 GetObject error: {0}")]
    GetObject(String),

    #[error("S3 PutObject error: {0}")]
    PutObject(String),
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("error opening file {path}: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("upload to s3://{bucket}/{key} failed: {source}")]
    Put {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },
}
