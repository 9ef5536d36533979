use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized blog article fields, as extracted from the post page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub tags: Vec<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub author: String,
    /// Raw HTML body of the post
    pub content: String,
}
