use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("invalid locator: {0}")]
    Invalid(String),

    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),
}

/// Address of an object in the audiobook bucket.
///
/// Two serialized forms are accepted on parse: the native `s3://bucket/key`
/// scheme and the HTTP(S) forms S3 hands back (path-style
/// `https://s3.region.amazonaws.com/bucket/key` and virtual-hosted-style
/// `https://bucket.s3.amazonaws.com/key`). Serialization always emits the
/// native scheme, so `parse(serialize(loc)) == loc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location {
    pub bucket: String,
    pub key: String,
}

impl Location {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn parse(input: &str) -> Result<Self, LocationError> {
        let url = Url::parse(input).map_err(|e| LocationError::Invalid(e.to_string()))?;

        match url.scheme() {
            "s3" => {
                let bucket = url
                    .host_str()
                    .ok_or_else(|| LocationError::Invalid(input.to_string()))?;
                Ok(Self::new(bucket, url.path().trim_start_matches('/')))
            }
            "http" | "https" => Self::from_http_url(&url),
            other => Err(LocationError::UnsupportedProtocol(other.to_string())),
        }
    }

    fn from_http_url(url: &Url) -> Result<Self, LocationError> {
        let host = url
            .host_str()
            .ok_or_else(|| LocationError::Invalid(url.to_string()))?;
        let path = url.path().trim_start_matches('/');

        let (first_label, _) = host.split_once('.').unwrap_or((host, ""));
        if first_label == "s3" {
            // Path-style: the first path segment is the bucket
            let (bucket, key) = path.split_once('/').unwrap_or((path, ""));
            Ok(Self::new(bucket, key))
        } else {
            // Virtual-hosted-style: the leading host label is the bucket
            Ok(Self::new(first_label, path))
        }
    }

    /// Append a path segment to the key, treating the key as a prefix.
    pub fn join(&self, segment: &str) -> Self {
        Self::new(
            self.bucket.clone(),
            format!("{}/{}", self.key.trim_end_matches('/'), segment),
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.to_string()
    }
}

impl TryFrom<String> for Location {
    type Error = LocationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
