use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::consumer::{ConsumerConfig, Worker};
use crate::processor::MessageProcessor;
use crate::queue::MessageQueue;

/// A fixed set of workers sharing one queue client and one processor.
pub struct ConsumerGroup<Q, P> {
    queue: Arc<Q>,
    processor: Arc<P>,
    config: ConsumerConfig,
    workers: usize,
}

impl<Q, P> ConsumerGroup<Q, P>
where
    Q: MessageQueue + 'static,
    P: MessageProcessor + 'static,
{
    pub fn new(queue: Arc<Q>, processor: Arc<P>, config: ConsumerConfig, workers: usize) -> Self {
        Self {
            queue,
            processor,
            config,
            workers,
        }
    }

    /// Start every worker and wait until all of them have exited.
    ///
    /// A worker that panics is logged and not restarted; its siblings keep
    /// running.
    pub async fn run(self, cancel: CancellationToken) {
        info!(workers = self.workers, "starting consumer group");

        let mut tasks = JoinSet::new();
        for id in 0..self.workers {
            let worker = Worker::new(
                id,
                Arc::clone(&self.queue),
                Arc::clone(&self.processor),
                self.config,
            );
            let cancel = cancel.clone();
            tasks.spawn(async move {
                if let Err(panic) = AssertUnwindSafe(worker.run(cancel)).catch_unwind().await {
                    error!(
                        worker = id,
                        panic = %panic_message(panic.as_ref()),
                        "worker panicked, stopping it"
                    );
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "worker task failed");
            }
        }

        info!("consumer group stopped");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
