//! reportgen-queue
//!
//! SQS consumption: a group of workers polling the report job queue, each
//! unwrapping the SNS envelope and handing the payload to a processor.

pub mod consumer;
pub mod envelope;
pub mod error;
pub mod group;
pub mod processor;
pub mod queue;
pub mod sqs;

pub use crate::consumer::{ConsumerConfig, DeletePolicy, WaitTime, Worker};
pub use crate::group::ConsumerGroup;
pub use crate::processor::MessageProcessor;
pub use crate::queue::{MessageQueue, QueueMessage, ReceiveOptions};
pub use crate::sqs::{QueueArn, SqsConfig, SqsQueue};
