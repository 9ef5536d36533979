pub mod error;
pub mod model;
pub mod service;

pub use error::ProcessorError;
pub use model::{Audiobook, AudioCodec, FailureReason, Resource, Speaker, StatusCode, StatusEntry, Transport};
pub use service::{AudiobookProcessor, ProcessorTask};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response for GET /audiobooks/:id
#[derive(Debug, Serialize, Deserialize)]
pub struct AudiobookResponse {
    pub id: i64,
    pub status: StatusResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<ResourceResponse>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub url: String,
    pub speaker: Speaker,
    pub transport: Transport,
    pub codec: AudioCodec,
    pub bitrate: u32,
    pub duration: String,
}

impl AudiobookResponse {
    /// Resources are presented only once the book is AVAILABLE; their URLs
    /// point at the CDN rather than the bucket.
    pub fn from_record(book: &Audiobook, cdn_base_url: &str) -> Self {
        let resources = if book.status() == StatusCode::Available {
            Some(
                book.resources()
                    .iter()
                    .map(|resource| ResourceResponse {
                        url: format!(
                            "{}/{}",
                            cdn_base_url.trim_end_matches('/'),
                            resource.location.key
                        ),
                        speaker: resource.speaker,
                        transport: resource.transport,
                        codec: resource.codec,
                        bitrate: resource.bitrate,
                        duration: resource.duration.clone(),
                    })
                    .collect(),
            )
        } else {
            None
        };

        Self {
            id: book.id,
            status: StatusResponse {
                name: book.status().as_str().to_string(),
                updated_at: book.last_status().map(StatusEntry::updated_at),
            },
            resources,
        }
    }
}
