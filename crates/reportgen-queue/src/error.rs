use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("invalid queue ARN {arn:?}: {reason}")]
    InvalidArn { arn: String, reason: String },

    #[error("SQS GetQueueUrl error: {0}")]
    GetQueueUrl(String),

    #[error("SQS ReceiveMessage error: {0}")]
    Receive(String),

    #[error("SQS DeleteMessage error: {0}")]
    Delete(String),
}

/// The message body is not an SNS notification carrying a `Message`.
#[derive(Debug, Error)]
#[error("unexpected message format, expected SNS envelope: {reason}")]
pub struct MalformedEnvelope {
    pub reason: String,
}
