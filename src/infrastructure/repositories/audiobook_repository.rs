use crate::domain::audiobook::model::{Audiobook, Resource, StatusEntry};
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use sqlx::types::Json;
use std::sync::Arc;

/// Durable storage for audiobook records, keyed by post id.
///
/// The orchestrator is the only writer after creation; reads and writes are
/// whole-record (last writer wins on redelivery races, see DESIGN.md).
#[async_trait]
pub trait AudiobookRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Audiobook>>;
    async fn insert(&self, book: &Audiobook) -> AppResult<()>;
    async fn update(&self, book: &Audiobook) -> AppResult<()>;
}

pub struct PgAudiobookRepository {
    pool: Arc<DbPool>,
}

impl PgAudiobookRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

type AudiobookRow = (i64, Json<Vec<StatusEntry>>, Json<Vec<Resource>>);

#[async_trait]
impl AudiobookRepository for PgAudiobookRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Audiobook>> {
        let pool = self.pool.as_ref();
        let row = sqlx::query_as::<_, AudiobookRow>(
            r#"
            SELECT id, status_history, resources
            FROM audiobooks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|(id, Json(status_history), Json(resources))| {
            Audiobook::from_parts(id, status_history, resources)
        }))
    }

    async fn insert(&self, book: &Audiobook) -> AppResult<()> {
        let pool = self.pool.as_ref();

        // ON CONFLICT keeps concurrent get-or-create calls idempotent
        sqlx::query(
            r#"
            INSERT INTO audiobooks (id, status_history, resources)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(book.id)
        .bind(Json(book.status_history().to_vec()))
        .bind(Json(book.resources().to_vec()))
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn update(&self, book: &Audiobook) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE audiobooks
            SET status_history = $2, resources = $3
            WHERE id = $1
            "#,
        )
        .bind(book.id)
        .bind(Json(book.status_history().to_vec()))
        .bind(Json(book.resources().to_vec()))
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("audiobook {}", book.id)));
        }

        Ok(())
    }
}
