use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid notifier configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build email: {0}")]
    Build(String),

    #[error("SES SendEmail error: {0}")]
    Send(String),
}
