use crate::infrastructure::storage::Location;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A configured (provider, voice) combination producing one narration track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Speaker {
    AwsPollySeoyeon,
    NaverClovaMijin,
    NaverClovaJinho,
}

impl Speaker {
    /// Lowercase name used in object keys and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwsPollySeoyeon => "aws_polly_seoyeon",
            Self::NaverClovaMijin => "naver_clova_mijin",
            Self::NaverClovaJinho => "naver_clova_jinho",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transport {
    Http,
    Hls,
    // reserved for future usage
    MpegDash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCodec {
    #[serde(rename = "MP3")]
    Mp3,
    #[serde(rename = "AAC_LC")]
    AacLc,
    // reserved for future usage
    #[serde(rename = "HE_AAC")]
    HeAac,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    InternalError,
}

/// Derived lifecycle state of an audiobook. `Unknown` is a sentinel for a
/// record with an empty history; it is not representable as a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Unknown,
    Queued,
    Processing,
    Available,
    Failed,
}

impl StatusCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Queued => "QUEUED",
            Self::Processing => "PROCESSING",
            Self::Available => "AVAILABLE",
            Self::Failed => "FAILED",
        }
    }
}

/// One entry of the append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum StatusEntry {
    #[serde(rename = "QUEUED")]
    Queued { updated_at: DateTime<Utc> },
    #[serde(rename = "PROCESSING")]
    Processing { updated_at: DateTime<Utc> },
    #[serde(rename = "AVAILABLE")]
    Available { updated_at: DateTime<Utc> },
    #[serde(rename = "FAILED")]
    Failed {
        updated_at: DateTime<Utc>,
        reason: FailureReason,
    },
}

impl StatusEntry {
    pub fn queued() -> Self {
        Self::Queued {
            updated_at: Utc::now(),
        }
    }

    pub fn processing() -> Self {
        Self::Processing {
            updated_at: Utc::now(),
        }
    }

    pub fn available() -> Self {
        Self::Available {
            updated_at: Utc::now(),
        }
    }

    pub fn failed(reason: FailureReason) -> Self {
        Self::Failed {
            updated_at: Utc::now(),
            reason,
        }
    }

    pub fn code(&self) -> StatusCode {
        match self {
            Self::Queued { .. } => StatusCode::Queued,
            Self::Processing { .. } => StatusCode::Processing,
            Self::Available { .. } => StatusCode::Available,
            Self::Failed { .. } => StatusCode::Failed,
        }
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            Self::Queued { updated_at }
            | Self::Processing { updated_at }
            | Self::Available { updated_at }
            | Self::Failed { updated_at, .. } => *updated_at,
        }
    }
}

/// One delivery variant of a finished narration track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub speaker: Speaker,
    pub transport: Transport,
    pub codec: AudioCodec,
    /// Overall bitrate, bits per second
    pub bitrate: u32,
    /// ISO-8601 duration
    pub duration: String,
    pub location: Location,
}

/// The durable audiobook record. The id maps 1:1 to a blog post id and is
/// immutable after creation; the status history only ever grows.
#[derive(Debug, Clone)]
pub struct Audiobook {
    pub id: i64,
    status_history: Vec<StatusEntry>,
    resources: Vec<Resource>,
}

impl Audiobook {
    /// Create a fresh record in QUEUED state.
    pub fn create(id: i64) -> Self {
        Self {
            id,
            status_history: vec![StatusEntry::queued()],
            resources: Vec::new(),
        }
    }

    /// Rebuild a record from its persisted parts.
    pub fn from_parts(id: i64, status_history: Vec<StatusEntry>, resources: Vec<Resource>) -> Self {
        Self {
            id,
            status_history,
            resources,
        }
    }

    /// Current status: the last history entry, or `Unknown` for an empty
    /// history (which should not occur for normally created records).
    pub fn status(&self) -> StatusCode {
        self.status_history
            .last()
            .map(StatusEntry::code)
            .unwrap_or(StatusCode::Unknown)
    }

    pub fn last_status(&self) -> Option<&StatusEntry> {
        self.status_history.last()
    }

    pub fn status_history(&self) -> &[StatusEntry] {
        &self.status_history
    }

    pub fn record_status(&mut self, entry: StatusEntry) {
        self.status_history.push(entry);
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn set_resources(&mut self, resources: Vec<Resource>) {
        self.resources = resources;
    }
}
