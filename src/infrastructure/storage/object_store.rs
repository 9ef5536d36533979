use super::Location;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use std::sync::Arc;

const DEFAULT_CACHE_CONTROL: &str = "public, max-age=3153600000";

#[derive(Debug, thiserror::Error)]
#[error("object store error: {0}")]
pub struct StorageError(pub String);

/// Upload capability of the audiobook bucket. Download and signed-URL
/// generation happen inside the audio workers, not in this service.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        location: &Location,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

pub struct S3ObjectStore {
    client: Arc<S3Client>,
}

impl S3ObjectStore {
    pub fn new(client: Arc<S3Client>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        location: &Location,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .cache_control(DEFAULT_CACHE_CONTROL)
            .send()
            .await
            .map_err(|e| StorageError(format!("failed to upload {}: {}", location, e)))?;

        tracing::debug!(location = %location, size_bytes = size, "uploaded object");

        Ok(())
    }
}
