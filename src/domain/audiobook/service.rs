use super::error::ProcessorError;
use super::model::{Audiobook, Resource, Speaker, StatusEntry};
use crate::domain::article::{Article, ArticleSource};
use crate::domain::speech::SpeechProvider;
use crate::infrastructure::repositories::AudiobookRepository;
use crate::infrastructure::storage::Location;
use crate::infrastructure::workers::{
    AudioJoiner, AudioTranscoder, JoinRequest, TranscodeRequest, TranscodingPreset,
};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Job-start message consumed from the task queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProcessorTask {
    pub id: i64,
}

/// The audiobook production pipeline: synthesis, join, transcode, finalize.
///
/// One `process` call handles one queue delivery. All collaborators are
/// injected so tests can substitute doubles.
pub struct AudiobookProcessor {
    repo: Arc<dyn AudiobookRepository>,
    articles: Arc<dyn ArticleSource>,
    speakers: Vec<(Speaker, Arc<dyn SpeechProvider>)>,
    joiner: Arc<dyn AudioJoiner>,
    transcoder: Arc<dyn AudioTranscoder>,
    presets: Vec<TranscodingPreset>,
    bucket: String,
}

impl AudiobookProcessor {
    pub fn new(
        repo: Arc<dyn AudiobookRepository>,
        articles: Arc<dyn ArticleSource>,
        speakers: Vec<(Speaker, Arc<dyn SpeechProvider>)>,
        joiner: Arc<dyn AudioJoiner>,
        transcoder: Arc<dyn AudioTranscoder>,
        presets: Vec<TranscodingPreset>,
        bucket: String,
    ) -> Self {
        Self {
            repo,
            articles,
            speakers,
            joiner,
            transcoder,
            presets,
            bucket,
        }
    }

    /// Handle one job-start delivery.
    ///
    /// Returns Ok when the message should be acknowledged: success, an
    /// absent record, or a permanent failure that has been recorded. Returns
    /// Err when the message must be redelivered - either the failure is
    /// classified retryable, or the record could not be loaded/persisted at
    /// all.
    pub async fn process(&self, task: ProcessorTask) -> Result<(), ProcessorError> {
        let Some(mut book) = self.repo.find_by_id(task.id).await? else {
            tracing::warn!(id = task.id, "audiobook record not found, skipping task");
            return Ok(());
        };

        match self.run(&mut book).await {
            Ok(()) => {
                tracing::info!(id = book.id, "audiobook available");
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    id = book.id,
                    error = %e,
                    retryable = e.retryable(),
                    "audiobook processing failed"
                );

                // The history must reflect the outcome before any retry
                // decision is acted on.
                book.record_status(StatusEntry::failed(e.reason()));
                self.repo.update(&book).await?;

                if e.retryable() {
                    Err(e)
                } else {
                    Ok(())
                }
            }
        }
    }

    async fn run(&self, book: &mut Audiobook) -> Result<(), ProcessorError> {
        book.record_status(StatusEntry::processing());
        self.repo.update(book).await?;

        let article = self.articles.read(book.id).await?;
        let document = render_document(&article);

        let tmp = Location::new(&self.bucket, format!("processing/{}", book.id));
        let output = Location::new(&self.bucket, format!("audiobooks/{}", book.id));
        tracing::debug!(id = book.id, tmp = %tmp, output = %output, "resolved working locations");

        let per_speaker = try_join_all(self.speakers.iter().map(|(speaker, provider)| {
            self.process_speaker(*speaker, provider.as_ref(), &document, &tmp, &output)
        }))
        .await?;

        book.set_resources(per_speaker.into_iter().flatten().collect());
        book.record_status(StatusEntry::available());
        self.repo.update(book).await?;

        Ok(())
    }

    /// Produce every configured delivery format for one narration voice.
    async fn process_speaker(
        &self,
        speaker: Speaker,
        provider: &dyn SpeechProvider,
        document: &str,
        tmp: &Location,
        output: &Location,
    ) -> Result<Vec<Resource>, ProcessorError> {
        tracing::info!(speaker = speaker.as_str(), "generating tts audio");
        let fragments = provider
            .synthesize(document, &tmp.join(speaker.as_str()))
            .await?;
        tracing::info!(
            speaker = speaker.as_str(),
            fragments = fragments.len(),
            "generated tts audio"
        );

        let track = self.consolidate(speaker, fragments, tmp).await?;

        let destination = output.join(speaker.as_str());
        try_join_all(
            self.presets
                .iter()
                .map(|preset| self.transcode(speaker, *preset, &track, &destination)),
        )
        .await
    }

    /// Collapse ordered fragments into the speaker's single track, joining
    /// only when the synthesis output was actually chunked.
    async fn consolidate(
        &self,
        speaker: Speaker,
        mut fragments: Vec<Location>,
        tmp: &Location,
    ) -> Result<Location, ProcessorError> {
        match fragments.len() {
            0 => Err(ProcessorError::internal(format!(
                "{} synthesis produced no fragments",
                speaker.as_str()
            ))),
            1 => {
                tracing::info!(
                    speaker = speaker.as_str(),
                    "tts output is not chunked, skipping join process"
                );
                Ok(fragments.remove(0))
            }
            count => {
                tracing::info!(speaker = speaker.as_str(), count, "joining tts outputs");
                let joined = self
                    .joiner
                    .join(JoinRequest {
                        sources: fragments,
                        destination: tmp.join(&format!("{}_joined.mp3", speaker.as_str())),
                    })
                    .await?;
                Ok(joined.location)
            }
        }
    }

    async fn transcode(
        &self,
        speaker: Speaker,
        preset: TranscodingPreset,
        source: &Location,
        destination: &Location,
    ) -> Result<Resource, ProcessorError> {
        tracing::info!(speaker = speaker.as_str(), preset = ?preset, "start transcoding");
        let response = self
            .transcoder
            .transcode(TranscodeRequest {
                source: source.clone(),
                destination: destination.clone(),
                preset,
            })
            .await?;
        tracing::info!(speaker = speaker.as_str(), preset = ?preset, "end transcoding");

        Ok(Resource {
            speaker,
            transport: response.transport,
            codec: response.codec,
            bitrate: response.bitrate,
            duration: response.duration,
            location: response.location,
        })
    }
}

/// Render the article into the rich-text document fed to synthesis: title,
/// category, body, in reading order.
pub fn render_document(article: &Article) -> String {
    format!(
        "<h1>{}</h1>\n<p>{}</p>\n<div>\n{}\n</div>",
        article.title, article.category, article.content
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_document_reads_title_then_category_then_body() {
        let article = Article {
            id: 42,
            title: "Weekly News".to_string(),
            category: "News".to_string(),
            tags: vec![],
            published_at: None,
            author: "editor".to_string(),
            content: "<p>body</p>".to_string(),
        };

        let document = render_document(&article);
        let title_at = document.find("Weekly News").unwrap();
        let category_at = document.find("News</p>").unwrap();
        let body_at = document.find("<p>body</p>").unwrap();
        assert!(title_at < category_at && category_at < body_at);
    }
}
