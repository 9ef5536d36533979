pub mod chunk;
pub mod clova;
pub mod polly;

pub use clova::{ClovaCredentials, ClovaSpeechProvider, ClovaVoice};
pub use polly::PollySpeechProvider;

use crate::infrastructure::storage::{Location, LocationError, StorageError};
use async_trait::async_trait;
use html2text::from_read;

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("unexpected synthesis task status: {0}")]
    UnexpectedStatus(String),

    /// Momentary provider condition (throttling, connection loss). The only
    /// speech failure worth a redelivery.
    #[error("transient synthesis failure: {0}")]
    Transient(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid synthesis output location: {0}")]
    Location(#[from] LocationError),
}

/// A speech-synthesis backend. Implementations strip the rich-text input to
/// plain text, chunk it under their own request limit and upload one audio
/// fragment per chunk under `output_prefix`.
///
/// The returned fragment locations are ordered: index i corresponds to chunk
/// index i, which the join stage relies on to keep the reading order.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn synthesize(
        &self,
        html: &str,
        output_prefix: &Location,
    ) -> Result<Vec<Location>, SpeechError>;
}

/// Convert rich HTML input to the plain text fed into synthesis.
///
/// Unlike a flat whitespace collapse this keeps newlines, because the chunker
/// closes chunks at paragraph boundaries.
pub fn html_to_text(html: &str) -> String {
    let text = from_read(html.as_bytes(), usize::MAX);

    let blank_lines = regex::Regex::new(r"\n{3,}").unwrap();
    blank_lines.replace_all(&text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_to_text_strips_markup() {
        let html = "<h1>Title</h1><p>Hello <strong>world</strong>!</p>";
        let text = html_to_text(html);
        assert!(!text.contains('<'));
        assert!(!text.contains('>'));
        assert!(text.contains("Title"));
        assert!(text.contains("Hello"));
        assert!(text.contains("world"));
    }

    #[test]
    fn html_to_text_keeps_paragraph_boundaries() {
        let html = "<p>first paragraph</p><p>second paragraph</p>";
        let text = html_to_text(html);
        assert!(
            text.contains('\n'),
            "expected a newline between paragraphs, got {text:?}"
        );
    }

    #[test]
    fn html_to_text_collapses_runs_of_blank_lines() {
        let html = "<p>a</p><br/><br/><br/><br/><p>b</p>";
        let text = html_to_text(html);
        assert!(!text.contains("\n\n\n"));
    }
}
