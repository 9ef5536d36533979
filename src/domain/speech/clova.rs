use super::{chunk::chunk, html_to_text, SpeechError, SpeechProvider};
use crate::infrastructure::storage::{Location, ObjectStore};
use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::StatusCode;
use std::sync::Arc;

const CLOVA_TTS_ENDPOINT: &str = "https://naveropenapi.apigw.ntruss.com/voice/v1/tts";

/// Clova CSS rejects requests over 4000 characters
const MAX_CHUNK_CHARS: usize = 4_000;

#[derive(Debug, Clone)]
pub struct ClovaCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Copy)]
pub enum ClovaVoice {
    Mijin,
    Jinho,
}

impl ClovaVoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mijin => "mijin",
            Self::Jinho => "jinho",
        }
    }
}

/// Synchronous speech provider backed by the Naver Clova CSS API. Each chunk
/// is one request whose response body goes straight into the object store at
/// `<prefix>/<voice>_<index>.mp3`.
pub struct ClovaSpeechProvider {
    http: reqwest::Client,
    credentials: ClovaCredentials,
    store: Arc<dyn ObjectStore>,
    voice: ClovaVoice,
}

impl ClovaSpeechProvider {
    pub fn new(
        http: reqwest::Client,
        credentials: ClovaCredentials,
        store: Arc<dyn ObjectStore>,
        voice: ClovaVoice,
    ) -> Self {
        Self {
            http,
            credentials,
            store,
            voice,
        }
    }

    async fn synthesize_chunk(
        &self,
        text: &str,
        output_prefix: &Location,
        index: usize,
    ) -> Result<Location, SpeechError> {
        let response = self
            .http
            .post(CLOVA_TTS_ENDPOINT)
            .header("X-NCP-APIGW-API-KEY-ID", &self.credentials.client_id)
            .header("X-NCP-APIGW-API-KEY", &self.credentials.client_secret)
            .form(&[
                ("speaker", self.voice.as_str()),
                ("speed", "1"),
                ("text", text),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    SpeechError::Transient(e.to_string())
                } else {
                    SpeechError::SynthesisFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SpeechError::Transient(format!(
                "clova throttled chunk {index}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::SynthesisFailed(format!(
                "clova returned {status} for chunk {index}: {body}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SpeechError::Transient(format!("reading clova response: {e}")))?;

        let location = output_prefix.join(&format!("{}_{}.mp3", self.voice.as_str(), index));
        tracing::debug!(location = %location, size_bytes = audio.len(), "uploading clova audio fragment");
        self.store
            .put(&location, audio.to_vec(), "audio/mpeg")
            .await?;

        Ok(location)
    }
}

#[async_trait]
impl SpeechProvider for ClovaSpeechProvider {
    async fn synthesize(
        &self,
        html: &str,
        output_prefix: &Location,
    ) -> Result<Vec<Location>, SpeechError> {
        let text = html_to_text(html);
        let chunks = chunk(&text, MAX_CHUNK_CHARS);

        tracing::info!(
            voice = self.voice.as_str(),
            text_length = text.len(),
            chunk_count = chunks.len(),
            "generating clova tts audio"
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
