use super::{chunk::chunk, html_to_text, SpeechError, SpeechProvider};
use crate::infrastructure::storage::Location;
use async_trait::async_trait;
use aws_sdk_polly::types::{OutputFormat, TaskStatus, TextType, VoiceId};
use aws_sdk_polly::Client as PollyClient;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;

/// AWS Polly accepts up to 100k characters per asynchronous task; stay well
/// under it.
const MAX_CHUNK_CHARS: usize = 50_000;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

const VOICE_NAME: &str = "seoyeon";

/// Asynchronous (polled) speech provider backed by AWS Polly synthesis
/// tasks. Polly writes the audio to the bucket itself; we poll each task
/// until it reports a terminal status and normalize the HTTP output URI to
/// the native locator form.
pub struct PollySpeechProvider {
    client: Arc<PollyClient>,
}

impl PollySpeechProvider {
    pub fn new(client: Arc<PollyClient>) -> Self {
        Self { client }
    }

    async fn synthesize_chunk(
        &self,
        text: &str,
        output_prefix: &Location,
        index: usize,
    ) -> Result<Location, SpeechError> {
        let key_prefix = output_prefix.join(&format!("{VOICE_NAME}_{index}")).key;

        let started = self
            .client
            .start_speech_synthesis_task()
            .output_format(OutputFormat::Mp3)
            .output_s3_bucket_name(&output_prefix.bucket)
            .output_s3_key_prefix(&key_prefix)
            .voice_id(VoiceId::Seoyeon)
            .text(text)
            .text_type(TextType::Text)
            .send()
            .await
            .map_err(|e| SpeechError::SynthesisFailed(format!("start task: {e}")))?;

        let task_id = started
            .synthesis_task()
            .and_then(|task| task.task_id())
            .ok_or_else(|| {
                SpeechError::SynthesisFailed("polly returned no synthesis task id".to_string())
            })?
            .to_string();

        tracing::debug!(task_id = %task_id, chunk_index = index, "polly synthesis task started");

        loop {
            let polled = self
                .client
                .get_speech_synthesis_task()
                .task_id(&task_id)
                .send()
                .await
                .map_err(|e| SpeechError::SynthesisFailed(format!("poll task {task_id}: {e}")))?;

            let task = polled.synthesis_task().ok_or_else(|| {
                SpeechError::SynthesisFailed(format!("task {task_id} vanished while polling"))
            })?;

            match task.task_status() {
                Some(TaskStatus::Scheduled) | Some(TaskStatus::InProgress) => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Some(TaskStatus::Completed) => {
                    let output_uri = task.output_uri().ok_or_else(|| {
                        SpeechError::SynthesisFailed(format!(
                            "task {task_id} completed without an output uri"
                        ))
                    })?;

                    // Polly reports an HTTP URL; normalize it to s3://
                    return Ok(Location::parse(output_uri)?);
                }
                Some(TaskStatus::Failed) => {
                    tracing::warn!(task_id = %task_id, reason = ?task.task_status_reason(), "polly synthesis task failed");
                    return Err(SpeechError::SynthesisFailed(format!(
                        "task {task_id} failed: {}",
                        task.task_status_reason().unwrap_or("no reason given")
                    )));
                }
                other => {
                    return Err(SpeechError::UnexpectedStatus(format!("{other:?}")));
                }
            }
        }
    }
}

#[async_trait]
impl SpeechProvider for PollySpeechProvider {
    async fn synthesize(
        &self,
        html: &str,
        output_prefix: &Location,
    ) -> Result<Vec<Location>, SpeechError> {
        let text = html_to_text(html);
        let chunks = chunk(&text, MAX_CHUNK_CHARS);

        tracing::info!(
            text_length = text.len(),
            chunk_count = chunks.len(),
            "generating polly tts audio"
        );

        try_join_all(
            chunks
                .iter()
                .enumerate()
                .map(|(index, piece)| self.synthesize_chunk(piece, output_prefix, index)),
        )
        .await
    }
}
