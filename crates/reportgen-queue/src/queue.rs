use std::collections::HashMap;
use std::time::Duration;

use reportgen_core::generator::BoxFuture;

use crate::error::QueueError;

/// A received message, detached from the SDK types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueMessage {
    pub message_id: Option<String>,
    pub receipt_handle: String,
    pub body: Option<String>,
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveOptions {
    pub max_messages: i32,
    /// Long-poll timeout. Zero returns immediately.
    pub wait_time: Duration,
    pub visibility_timeout: Duration,
}

/// The queue operations a worker needs.
pub trait MessageQueue: Send + Sync {
    fn receive(&self, options: ReceiveOptions) -> BoxFuture<'_, Result<Vec<QueueMessage>, QueueError>>;

    fn delete<'a>(&'a self, message: &'a QueueMessage) -> BoxFuture<'a, Result<(), QueueError>>;
}
