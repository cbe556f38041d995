//! PostgreSQL Video Repository Implementation
//!
//! Implements the `VideoRepository` port on top of a `sqlx` connection pool.
//! Driver errors are converted to `VideoError::Persistence`.

use std::future::Future;

use reelbox_domain::{ports::VideoRepository, video::Result, OwnerId, Video, VideoError, VideoId};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres};
use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use crate::row::VideoRow;

const VIDEO_COLUMNS: &str =
    "id, owner_id, original_filename, storage_path, size_bytes, format, duration_seconds, created_at";

fn db_error(operation: &str, err: sqlx::Error) -> VideoError {
    error!(operation, error = %err, "Video repository query failed");
    VideoError::persistence(format!("{} failed: {}", operation, err))
}

/// Repository for video metadata
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> std::result::Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!(max_connections, "Connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl VideoRepository for PgVideoRepository {
    fn save(&self, video: &Video) -> impl Future<Output = Result<Video>> + Send {
        let pool = self.pool.clone();
        let row = VideoRow::from_entity(video);

        let span = info_span!(
            "pg.save",
            db.table = "videos",
            db.operation = "upsert",
            db.record_id = %video.id()
        );

        async move {
            let row = row?;
            let query = format!(
                r#"
                INSERT INTO videos ({VIDEO_COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO UPDATE SET
                    original_filename = EXCLUDED.original_filename,
                    storage_path = EXCLUDED.storage_path,
                    size_bytes = EXCLUDED.size_bytes,
                    format = EXCLUDED.format,
                    duration_seconds = EXCLUDED.duration_seconds
                RETURNING {VIDEO_COLUMNS}
                "#
            );

            let saved = sqlx::query_as::<Postgres, VideoRow>(&query)
                .bind(row.id)
                .bind(row.owner_id)
                .bind(&row.original_filename)
                .bind(&row.storage_path)
                .bind(row.size_bytes)
                .bind(&row.format)
                .bind(row.duration_seconds)
                .bind(row.created_at)
                .fetch_one(&pool)
                .await
                .map_err(|err| db_error("save", err))?;

            debug!(video_id = %saved.id, "Saved video record");
            saved.into_entity()
        }
        .instrument(span)
    }

    fn find_by_id(&self, id: &VideoId) -> impl Future<Output = Result<Option<Video>>> + Send {
        let pool = self.pool.clone();
        let id: Uuid = (*id).into();

        let span = info_span!(
            "pg.find_by_id",
            db.table = "videos",
            db.operation = "select",
            db.record_id = %id
        );

        async move {
            let query = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1");

            let row = sqlx::query_as::<Postgres, VideoRow>(&query)
                .bind(id)
                .fetch_optional(&pool)
                .await
                .map_err(|err| db_error("find_by_id", err))?;

            row.map(VideoRow::into_entity).transpose()
        }
        .instrument(span)
    }

    fn find_by_owner(
        &self,
        owner_id: &OwnerId,
        skip: u64,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<Video>>> + Send {
        let pool = self.pool.clone();
        let owner_id: Uuid = (*owner_id).into();
        let offset = i64::try_from(skip).unwrap_or(i64::MAX);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let span = info_span!(
            "pg.find_by_owner",
            db.table = "videos",
            db.operation = "select",
            owner_id = %owner_id
        );

        async move {
            // id breaks ties between rows created in the same instant
            let query = format!(
                "SELECT {VIDEO_COLUMNS} FROM videos WHERE owner_id = $1 \
                 ORDER BY created_at DESC, id DESC OFFSET $2 LIMIT $3"
            );

            let rows = sqlx::query_as::<Postgres, VideoRow>(&query)
                .bind(owner_id)
                .bind(offset)
                .bind(limit)
                .fetch_all(&pool)
                .await
                .map_err(|err| db_error("find_by_owner", err))?;

            rows.into_iter().map(VideoRow::into_entity).collect()
        }
        .instrument(span)
    }

    fn count_by_owner(&self, owner_id: &OwnerId) -> impl Future<Output = Result<u64>> + Send {
        let pool = self.pool.clone();
        let owner_id: Uuid = (*owner_id).into();

        let span = info_span!(
            "pg.count_by_owner",
            db.table = "videos",
            db.operation = "count",
            owner_id = %owner_id
        );

        async move {
            let count = sqlx::query_scalar::<Postgres, i64>(
                "SELECT COUNT(*) FROM videos WHERE owner_id = $1",
            )
            .bind(owner_id)
            .fetch_one(&pool)
            .await
            .map_err(|err| db_error("count_by_owner", err))?;

            Ok(u64::try_from(count).unwrap_or(0))
        }
        .instrument(span)
    }

    fn delete(&self, id: &VideoId) -> impl Future<Output = Result<bool>> + Send {
        let pool = self.pool.clone();
        let id: Uuid = (*id).into();

        let span = info_span!(
            "pg.delete",
            db.table = "videos",
            db.operation = "delete",
            db.record_id = %id
        );

        async move {
            let result = sqlx::query("DELETE FROM videos WHERE id = $1")
                .bind(id)
                .execute(&pool)
                .await
                .map_err(|err| db_error("delete", err))?;

            Ok(result.rows_affected() > 0)
        }
        .instrument(span)
    }
}
