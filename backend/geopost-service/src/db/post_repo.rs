use crate::metrics::record_candidates;
use crate::models::{NewPost, Post};
use crate::SERVICE_NAME;
use async_trait::async_trait;
use chrono::Utc;
use db_pool::acquire_with_metrics;
use geo_query::{BoundingBox, CandidateSource, GeoError, GeoResult, QrPostSource};
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

/// Insert a post and return the stored row
pub async fn insert_post<'e, E>(executor: E, post: &NewPost) -> Result<Post, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let upload = post.upload.as_ref();

    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (id, post_type, title, description, lat, lng, media_url, thumb_url,
                           size, content_type, original_name, created_by, scan_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, ?, ?)
        RETURNING id, post_type, title, description, lat, lng, media_url, thumb_url,
                  size, content_type, original_name, created_by, scan_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(post.kind)
    .bind(post.title.as_deref())
    .bind(post.description.as_deref())
    .bind(post.location.lat)
    .bind(post.location.lng)
    .bind(upload.map(|u| u.media_url()))
    .bind(upload.map(|u| u.size))
    .bind(upload.and_then(|u| u.content_type.clone()))
    .bind(upload.map(|u| u.original_name.clone()))
    .bind(post.created_by.as_deref())
    .bind(post.scan_id)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

/// Most recent posts, newest first
pub async fn list_latest<'e, E>(executor: E, limit: i64) -> Result<Vec<Post>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, post_type, title, description, lat, lng, media_url, thumb_url,
               size, content_type, original_name, created_by, scan_id, created_at
        FROM posts
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(executor)
    .await
}

/// Posts whose coordinates fall inside `bbox` (both ends inclusive), newest first
pub async fn list_in_box<'e, E>(
    executor: E,
    bbox: &BoundingBox,
    cap: i64,
) -> Result<Vec<Post>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, post_type, title, description, lat, lng, media_url, thumb_url,
               size, content_type, original_name, created_by, scan_id, created_at
        FROM posts
        WHERE lat BETWEEN ? AND ? AND lng BETWEEN ? AND ?
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(bbox.min_lat)
    .bind(bbox.max_lat)
    .bind(bbox.min_lng)
    .bind(bbox.max_lng)
    .bind(cap)
    .fetch_all(executor)
    .await
}

/// Posts attached to any scan of `qr_payload`, newest first
pub async fn list_by_qr_payload<'e, E>(
    executor: E,
    qr_payload: &str,
    limit: i64,
) -> Result<Vec<Post>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Post>(
        r#"
        SELECT p.id, p.post_type, p.title, p.description, p.lat, p.lng, p.media_url,
               p.thumb_url, p.size, p.content_type, p.original_name, p.created_by,
               p.scan_id, p.created_at
        FROM posts p
        JOIN scans s ON p.scan_id = s.id
        WHERE s.qr_payload = ?
        ORDER BY p.created_at DESC, p.rowid DESC
        LIMIT ?
        "#,
    )
    .bind(qr_payload)
    .bind(limit)
    .fetch_all(executor)
    .await
}

/// SQLite-backed storage collaborator for the geo query engine
#[derive(Clone)]
pub struct PostStore {
    pool: SqlitePool,
}

impl PostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn storage_error(operation: &'static str, err: sqlx::Error) -> GeoError {
    tracing::warn!(operation, error = %err, "post storage query failed");
    GeoError::storage(err.to_string())
}

#[async_trait]
impl CandidateSource for PostStore {
    type Record = Post;

    async fn candidates_in_box(&self, bbox: &BoundingBox, cap: usize) -> GeoResult<Vec<Post>> {
        let mut conn = acquire_with_metrics(&self.pool, SERVICE_NAME)
            .await
            .map_err(|e| storage_error("candidates_in_box", e))?;

        let cap = i64::try_from(cap).unwrap_or(i64::MAX);
        let rows = list_in_box(&mut *conn, bbox, cap)
            .await
            .map_err(|e| storage_error("candidates_in_box", e))?;

        record_candidates(rows.len());
        Ok(rows)
    }
}

#[async_trait]
impl QrPostSource for PostStore {
    type Record = Post;

    async fn posts_by_qr_payload(&self, qr_payload: &str, limit: usize) -> GeoResult<Vec<Post>> {
        let mut conn = acquire_with_metrics(&self.pool, SERVICE_NAME)
            .await
            .map_err(|e| storage_error("posts_by_qr_payload", e))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        list_by_qr_payload(&mut *conn, qr_payload, limit)
            .await
            .map_err(|e| storage_error("posts_by_qr_payload", e))
    }
}
