use crate::models::Scan;
use chrono::Utc;
use geo_query::GeoPoint;
use sqlx::{Executor, Sqlite};
use uuid::Uuid;

/// Record a scan event
pub async fn insert_scan<'e, E>(
    executor: E,
    qr_payload: &str,
    location: GeoPoint,
    session_id: Option<&str>,
    spot_id: Option<&str>,
) -> Result<Scan, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Scan>(
        r#"
        INSERT INTO scans (id, qr_payload, lat, lng, session_id, spot_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id, qr_payload, lat, lng, session_id, spot_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(qr_payload)
    .bind(location.lat)
    .bind(location.lng)
    .bind(session_id)
    .bind(spot_id)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}
