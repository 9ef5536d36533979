use crate::domain::audiobook::model::{AudioCodec, Transport};
use crate::infrastructure::storage::Location;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Target delivery format handled by the transcode worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranscodingPreset {
    /// HLS: AAC segments plus a manifest
    SegmentedStreaming,
    /// One self-contained compressed MP3 file
    SingleFileCompressed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Ordered fragment locations, at least two
    pub sources: Vec<Location>,
    pub destination: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeRequest {
    pub source: Location,
    /// Prefix under which the worker places its outputs
    pub destination: Location,
    pub preset: TranscodingPreset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeResponse {
    /// For the segmented preset this points at the manifest; the worker
    /// uploads the referenced segments under the same prefix itself.
    pub location: Location,
    pub transport: Transport,
    pub codec: AudioCodec,
    pub bitrate: u32,
    /// ISO-8601 duration
    pub duration: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("worker request failed with status {status}: {body}")]
    Failed { status: u16, body: String },

    #[error("worker unreachable: {0}")]
    Transient(String),

    #[error("worker returned an invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait AudioJoiner: Send + Sync {
    /// Concatenate ordered audio fragments into one consolidated track.
    async fn join(&self, request: JoinRequest) -> Result<JoinResponse, WorkerError>;
}

#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Transcode a consolidated track into one delivery format.
    async fn transcode(&self, request: TranscodeRequest) -> Result<TranscodeResponse, WorkerError>;
}

/// Invoke a worker endpoint with a JSON request/response pair. Any non-2xx
/// result is a hard error; only transport-level failures count as transient.
async fn invoke<Req, Res>(
    http: &reqwest::Client,
    endpoint: &str,
    request: &Req,
) -> Result<Res, WorkerError>
where
    Req: Serialize + Sync,
    Res: DeserializeOwned,
{
    let response = http
        .post(endpoint)
        .json(request)
        .send()
        .await
        .map_err(|e| WorkerError::Transient(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(WorkerError::Failed {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| WorkerError::InvalidResponse(e.to_string()))
}

/// Client for the sox-based concatenation worker.
pub struct HttpAudioJoiner {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpAudioJoiner {
    pub fn new(http: reqwest::Client, endpoint: String) -> Self {
        Self { http, endpoint }
    }
}

#[async_trait]
impl AudioJoiner for HttpAudioJoiner {
    async fn join(&self, request: JoinRequest) -> Result<JoinResponse, WorkerError> {
        tracing::debug!(
            sources = request.sources.len(),
            destination = %request.destination,
            "invoking audio joiner"
        );
        invoke(&self.http, &self.endpoint, &request).await
    }
}

/// Client for the ffmpeg-based transcode worker.
pub struct HttpAudioTranscoder {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpAudioTranscoder {
    pub fn new(http: reqwest::Client, endpoint: String) -> Self {
        Self { http, endpoint }
    }
}

#[async_trait]
impl AudioTranscoder for HttpAudioTranscoder {
    async fn transcode(&self, request: TranscodeRequest) -> Result<TranscodeResponse, WorkerError> {
        tracing::debug!(
            source = %request.source,
            destination = %request.destination,
            preset = ?request.preset,
            "invoking audio transcoder"
        );
        invoke(&self.http, &self.endpoint, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audiobook::model::{AudioCodec, Transport};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn join_request_serializes_locators_as_urls() {
        let request = JoinRequest {
            sources: vec![
                Location::new("audiobooks", "processing/42/mijin_0.mp3"),
                Location::new("audiobooks", "processing/42/mijin_1.mp3"),
            ],
            destination: Location::new("audiobooks", "processing/42/naver_clova_mijin_joined.mp3"),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "sources": [
                    "s3://audiobooks/processing/42/mijin_0.mp3",
                    "s3://audiobooks/processing/42/mijin_1.mp3",
                ],
                "destination": "s3://audiobooks/processing/42/naver_clova_mijin_joined.mp3",
            })
        );
    }

    #[test]
    fn transcode_request_uses_screaming_preset_names() {
        let request = TranscodeRequest {
            source: Location::new("audiobooks", "processing/42/track.mp3"),
            destination: Location::new("audiobooks", "audiobooks/42/aws_polly_seoyeon"),
            preset: TranscodingPreset::SegmentedStreaming,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["preset"], "SEGMENTED_STREAMING");

        let single = serde_json::to_value(TranscodingPreset::SingleFileCompressed).unwrap();
        assert_eq!(single, "SINGLE_FILE_COMPRESSED");
    }

    #[test]
    fn transcode_response_deserializes_the_worker_contract() {
        let body = json!({
            "location": "s3://audiobooks/audiobooks/42/aws_polly_seoyeon/medium.m3u8",
            "transport": "HLS",
            "codec": "AAC_LC",
            "bitrate": 32000,
            "duration": "PT3M20S",
        });

        let response: TranscodeResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.transport, Transport::Hls);
        assert_eq!(response.codec, AudioCodec::AacLc);
        assert_eq!(response.bitrate, 32_000);
        assert_eq!(response.duration, "PT3M20S");
    }
}
