use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::envelope;
use crate::error::{MalformedEnvelope, QueueError};
use crate::processor::MessageProcessor;
use crate::queue::{MessageQueue, QueueMessage, ReceiveOptions};

/// SQS caps a single receive at ten messages.
pub const MAX_MESSAGES: i32 = 10;

/// What to do with a message whose processing returned an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Delete once `process_message` returns, whatever the outcome.
    #[default]
    Always,
    /// Leave transient failures on the queue so they are redelivered after
    /// the visibility timeout. Poison messages are still deleted.
    RetainTransient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerConfig {
    pub max_messages: i32,
    pub visibility_timeout: Duration,
    /// Long-poll wait used after an empty receive.
    pub max_wait: Duration,
    pub delete_policy: DeletePolicy,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            max_messages: MAX_MESSAGES,
            visibility_timeout: Duration::from_secs(30),
            max_wait: Duration::from_secs(20),
            delete_policy: DeletePolicy::Always,
        }
    }
}

/// Adaptive long-poll wait: poll immediately while there is work, wait up
/// to `idle` once the queue runs dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTime {
    idle: Duration,
    busy: Duration,
    current: Duration,
}

impl WaitTime {
    pub fn new(idle: Duration) -> Self {
        Self {
            idle,
            busy: Duration::ZERO,
            current: Duration::ZERO,
        }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    /// Pick the wait for the next poll from the size of the last batch.
    pub fn observe(&mut self, received: usize) {
        self.current = if received == 0 { self.idle } else { self.busy };
    }
}

/// One poll / process / delete loop.
pub struct Worker<Q, P> {
    id: usize,
    queue: Arc<Q>,
    processor: Arc<P>,
    config: ConsumerConfig,
    wait: WaitTime,
}

impl<Q, P> Worker<Q, P>
where
    Q: MessageQueue,
    P: MessageProcessor,
{
    pub fn new(id: usize, queue: Arc<Q>, processor: Arc<P>, config: ConsumerConfig) -> Self {
        Self {
            id,
            queue,
            processor,
            wait: WaitTime::new(config.max_wait),
            config,
        }
    }

    pub fn wait_time(&self) -> Duration {
        self.wait.current()
    }

    /// Loop until `cancel` fires. Cancellation interrupts a pending poll but
    /// never a batch that is already being processed.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(worker = self.id, "worker started");

        while !cancel.is_cancelled() {
            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                received = self.receive() => received,
            };
            self.handle_batch(received).await;
        }

        info!(worker = self.id, "worker stopped");
    }

    /// Run a single poll and process whatever it returned. Returns the batch
    /// size, or `None` when the poll failed.
    pub async fn poll_once(&mut self) -> Option<usize> {
        let received = self.receive().await;
        self.handle_batch(received).await
    }

    async fn receive(&self) -> Result<Vec<QueueMessage>, QueueError> {
        self.queue
            .receive(ReceiveOptions {
                max_messages: self.config.max_messages,
                wait_time: self.wait.current(),
                visibility_timeout: self.config.visibility_timeout,
            })
            .await
    }

    async fn handle_batch(
        &mut self,
        received: Result<Vec<QueueMessage>, QueueError>,
    ) -> Option<usize> {
        let messages = match received {
            Ok(messages) => messages,
            Err(e) => {
                error!(worker = self.id, error = %e, "error reading queue messages");
                return None;
            }
        };
        let count = messages.len();

        self.wait.observe(messages.len());
        debug!(
            worker = self.id,
            received = messages.len(),
            next_wait_secs = self.wait.current().as_secs(),
            "poll complete"
        );

        for message in messages {
            self.handle_message(message).await;
        }
        Some(count)
    }

    async fn handle_message(&self, message: QueueMessage) {
        let message_id = message.message_id.as_deref().unwrap_or_default();

        let payload = match message.body.as_deref() {
            Some(body) => envelope::unwrap(body),
            None => Err(MalformedEnvelope {
                reason: "empty message body".to_string(),
            }),
        };

        match payload {
            Err(e) => {
                error!(
                    worker = self.id,
                    message_id = %message_id,
                    error = %e,
                    "discarding malformed message"
                );
            }
            Ok(payload) => {
                if let Err(e) = self.processor.process_message(&payload).await {
                    let transient = self.processor.is_transient(&e);
                    error!(
                        worker = self.id,
                        message_id = %message_id,
                        attributes = ?message.attributes,
                        transient,
                        error = %e,
                        "error processing message"
                    );
                    if transient && self.config.delete_policy == DeletePolicy::RetainTransient {
                        warn!(
                            worker = self.id,
                            message_id = %message_id,
                            "leaving message on the queue for redelivery"
                        );
                        return;
                    }
                }
            }
        }

        if let Err(e) = self.queue.delete(&message).await {
            error!(
                worker = self.id,
                message_id = %message_id,
                error = %e,
                "error deleting message"
            );
        }
    }
}
