use std::time::Duration;

use aws_config::SdkConfig;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::config::Region;
use aws_sdk_sqs::types::{Message, MessageSystemAttributeName};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use reportgen_core::generator::BoxFuture;

use crate::consumer::{ConsumerConfig, DeletePolicy, MAX_MESSAGES};
use crate::error::QueueError;
use crate::queue::{MessageQueue, QueueMessage, ReceiveOptions};

/// Longest long-poll SQS accepts.
const MAX_WAIT_SECS: u64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqsConfig {
    pub queue_arn: String,
    #[serde(default = "default_visibility_timeout")]
    pub visibility_timeout_secs: u64,
    #[serde(default = "default_max_wait")]
    pub max_wait_secs: u64,
    /// Override for local stacks such as LocalStack or ElasticMQ.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_processors")]
    pub number_of_processors: usize,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

fn default_visibility_timeout() -> u64 {
    30
}

fn default_max_wait() -> u64 {
    MAX_WAIT_SECS
}

fn default_processors() -> usize {
    1
}

impl SqsConfig {
    pub fn consumer_config(&self) -> ConsumerConfig {
        ConsumerConfig {
            max_messages: MAX_MESSAGES,
            visibility_timeout: Duration::from_secs(self.visibility_timeout_secs),
            max_wait: Duration::from_secs(self.max_wait_secs.min(MAX_WAIT_SECS)),
            delete_policy: self.delete_policy,
        }
    }
}

/// The parts of an SQS queue ARN needed to resolve its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueArn {
    pub region: String,
    pub account_id: String,
    pub queue_name: String,
}

impl QueueArn {
    /// Parse `arn:<partition>:sqs:<region>:<account>:<queue name>`.
    pub fn parse(arn: &str) -> Result<Self, QueueError> {
        let invalid = |reason: &str| QueueError::InvalidArn {
            arn: arn.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = arn.splitn(6, ':').collect();
        if parts.len() != 6 || parts[0] != "arn" {
            return Err(invalid("expected arn:partition:service:region:account:resource"));
        }
        if parts[2] != "sqs" {
            return Err(invalid("not an SQS ARN"));
        }
        if parts[5].is_empty() {
            return Err(invalid("missing queue name"));
        }

        Ok(Self {
            region: parts[3].to_string(),
            account_id: parts[4].to_string(),
            queue_name: parts[5].to_string(),
        })
    }
}

/// [`MessageQueue`] backed by a real SQS queue.
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    /// Build a client for the queue's region and resolve its URL.
    pub async fn connect(sdk_config: &SdkConfig, config: &SqsConfig) -> Result<Self, QueueError> {
        let arn = QueueArn::parse(&config.queue_arn)?;

        let mut builder = aws_sdk_sqs::config::Builder::from(sdk_config);
        if !arn.region.is_empty() {
            builder = builder.region(Region::new(arn.region.clone()));
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        let client = Client::from_conf(builder.build());

        let mut request = client.get_queue_url().queue_name(&arn.queue_name);
        if !arn.account_id.is_empty() {
            request = request.queue_owner_aws_account_id(&arn.account_id);
        }
        let output = request
            .send()
            .await
            .map_err(|e| QueueError::GetQueueUrl(e.into_service_error().to_string()))?;
        let queue_url = output
            .queue_url()
            .ok_or_else(|| QueueError::GetQueueUrl("response carried no queue URL".to_string()))?
            .to_string();

        info!(queue_url = %queue_url, "resolved SQS queue");
        Ok(Self { client, queue_url })
    }
}

impl MessageQueue for SqsQueue {
    fn receive(&self, options: ReceiveOptions) -> BoxFuture<'_, Result<Vec<QueueMessage>, QueueError>> {
        Box::pin(async move {
            let output = self
                .client
                .receive_message()
                .queue_url(&self.queue_url)
                .max_number_of_messages(options.max_messages)
                .wait_time_seconds(secs(options.wait_time.min(Duration::from_secs(MAX_WAIT_SECS))))
                .visibility_timeout(secs(options.visibility_timeout))
                .message_system_attribute_names(MessageSystemAttributeName::All)
                .send()
                .await
                .map_err(|e| QueueError::Receive(e.into_service_error().to_string()))?;

            Ok(output
                .messages
                .unwrap_or_default()
                .into_iter()
                .filter_map(into_queue_message)
                .collect())
        })
    }

    fn delete<'a>(&'a self, message: &'a QueueMessage) -> BoxFuture<'a, Result<(), QueueError>> {
        Box::pin(async move {
            self.client
                .delete_message()
                .queue_url(&self.queue_url)
                .receipt_handle(&message.receipt_handle)
                .send()
                .await
                .map_err(|e| QueueError::Delete(e.into_service_error().to_string()))?;
            Ok(())
        })
    }
}

fn secs(duration: Duration) -> i32 {
    i32::try_from(duration.as_secs()).unwrap_or(i32::MAX)
}

fn into_queue_message(message: Message) -> Option<QueueMessage> {
    let Some(receipt_handle) = message.receipt_handle else {
        warn!(message_id = ?message.message_id, "received message without receipt handle");
        return None;
    };

    let attributes = message
        .attributes
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name.as_str().to_string(), value))
        .collect();

    Some(QueueMessage {
        message_id: message.message_id,
        receipt_handle,
        body: message.body,
        attributes,
    })
}
