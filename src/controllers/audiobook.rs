use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    domain::article::ArticleSource,
    domain::audiobook::{Audiobook, AudiobookResponse, ProcessorTask},
    error::{AppError, AppResult},
    infrastructure::queue::TaskQueue,
    infrastructure::repositories::AudiobookRepository,
};

pub struct AudiobookController {
    repo: Arc<dyn AudiobookRepository>,
    articles: Arc<dyn ArticleSource>,
    queue: Arc<dyn TaskQueue>,
    cdn_base_url: String,
}

impl AudiobookController {
    pub fn new(
        repo: Arc<dyn AudiobookRepository>,
        articles: Arc<dyn ArticleSource>,
        queue: Arc<dyn TaskQueue>,
        cdn_base_url: String,
    ) -> Self {
        Self {
            repo,
            articles,
            queue,
            cdn_base_url,
        }
    }

    /// GET /audiobooks/{id} - Get (or lazily create) the audiobook of a post
    ///
    /// Idempotent: an existing record is returned as-is regardless of its
    /// state; otherwise the record is created in QUEUED and a production
    /// task is enqueued.
    pub async fn get_audiobook(
        State(controller): State<Arc<AudiobookController>>,
        Path(id): Path<i64>,
    ) -> AppResult<Json<AudiobookResponse>> {
        if id <= 0 {
            return Err(AppError::BadRequest(
                "id must be a positive integer".to_string(),
            ));
        }

        if let Some(book) = controller.repo.find_by_id(id).await? {
            return Ok(Json(AudiobookResponse::from_record(
                &book,
                &controller.cdn_base_url,
            )));
        }

        let exists = controller
            .articles
            .exists(id)
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;
        if !exists {
            return Err(AppError::NotFound(
                "the requested article was not found on the blog".to_string(),
            ));
        }

        let book = Audiobook::create(id);
        controller.repo.insert(&book).await?;
        controller.queue.enqueue(&ProcessorTask { id }).await?;

        tracing::info!(id, "created audiobook record and enqueued production");

        Ok(Json(AudiobookResponse::from_record(
            &book,
            &controller.cdn_base_url,
        )))
    }
}
