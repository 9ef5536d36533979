use crate::domain::audiobook::service::{AudiobookProcessor, ProcessorTask};
use crate::error::AppError;
use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;
use std::sync::Arc;
use std::time::Duration;

/// Long-poll wait per receive call
const RECEIVE_WAIT_SECONDS: i32 = 20;
const RECEIVE_BATCH_SIZE: i32 = 5;
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Producer side of the task queue.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, task: &ProcessorTask) -> Result<(), AppError>;
}

pub struct SqsTaskQueue {
    client: Arc<SqsClient>,
    queue_url: String,
}

impl SqsTaskQueue {
    pub fn new(client: Arc<SqsClient>, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl TaskQueue for SqsTaskQueue {
    async fn enqueue(&self, task: &ProcessorTask) -> Result<(), AppError> {
        let body = serde_json::to_string(task).map_err(|e| AppError::Internal(e.to_string()))?;

        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("failed to enqueue task: {e}")))?;

        tracing::info!(id = task.id, "enqueued audiobook task");

        Ok(())
    }
}

/// Consumer loop: delivery is at-least-once and redelivery is the only retry
/// mechanism. A message is deleted when the processor settles the job (either
/// success or a permanent failure) and left on the queue when the failure is
/// retryable.
pub struct TaskConsumer {
    client: Arc<SqsClient>,
    queue_url: String,
    processor: Arc<AudiobookProcessor>,
}

impl TaskConsumer {
    pub fn new(client: Arc<SqsClient>, queue_url: String, processor: Arc<AudiobookProcessor>) -> Self {
        Self {
            client,
            queue_url,
            processor,
        }
    }

    pub async fn run(self) {
        tracing::info!(queue_url = %self.queue_url, "task consumer started");

        loop {
            let received = self
                .client
                .receive_message()
                .queue_url(&self.queue_url)
                .max_number_of_messages(RECEIVE_BATCH_SIZE)
                .wait_time_seconds(RECEIVE_WAIT_SECONDS)
                .send()
                .await;

            let output = match received {
                Ok(output) => output,
                Err(e) => {
                    tracing::error!(error = %e, "failed to receive messages, backing off");
                    tokio::time::sleep(RECEIVE_ERROR_BACKOFF).await;
                    continue;
                }
            };

            for message in output.messages.unwrap_or_default() {
                let Some(body) = message.body() else {
                    continue;
                };

                let task: ProcessorTask = match serde_json::from_str(body) {
                    Ok(task) => task,
                    Err(e) => {
                        tracing::warn!(error = %e, body, "dropping malformed task message");
                        self.delete(message.receipt_handle()).await;
                        continue;
                    }
                };

                match self.processor.process(task).await {
                    Ok(()) => self.delete(message.receipt_handle()).await,
                    Err(e) => {
                        tracing::warn!(
                            id = task.id,
                            error = %e,
                            "processing failed, leaving message for redelivery"
                        );
                    }
                }
            }
        }
    }

    async fn delete(&self, receipt_handle: Option<&str>) {
        let Some(receipt_handle) = receipt_handle else {
            return;
        };

        if let Err(e) = self
            .client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
        {
            // The message will come back; processing is idempotent enough to
            // absorb that.
            tracing::warn!(error = %e, "failed to delete message");
        }
    }
}
