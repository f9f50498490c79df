/// Post handlers - proximity, QR-scoped and latest listings plus creation
use super::ItemsResponse;
use crate::config::{GeoConfig, UploadConfig};
use crate::error::{AppError, Result};
use crate::metrics::{record_query, QueryOutcome};
use crate::models::StoredUpload;
use crate::services::{PostDraft, PostService};
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use geo_query::{GeoPoint, ProximityQuery, QrQuery};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWriteExt;

/// Text fields larger than this are rejected
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex =
        Regex::new(r"[^A-Za-z0-9_.\-]+").expect("filename pattern is valid");
}

/// Query values stay raw strings: an empty value means "use the default"
/// and numbers may use any decimal notation (`1e3`, `50.0`).
#[derive(Debug, Deserialize)]
pub struct NearQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QrListQuery {
    pub qr: Option<String>,
    pub limit: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_number(name: &str, value: &Option<String>) -> Result<Option<f64>> {
    non_empty(value)
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| AppError::ValidationError(format!("{} must be a number", name)))
        })
        .transpose()
}

/// Fractional limits truncate toward zero before clamping.
fn parse_limit(value: &Option<String>, default: i64) -> Result<i64> {
    match parse_number("limit", value)? {
        None => Ok(default),
        Some(n) if n.is_finite() => Ok(n.trunc() as i64),
        Some(_) => Err(AppError::ValidationError(
            "limit must be a finite number".into(),
        )),
    }
}

fn outcome_of(err: &AppError) -> QueryOutcome {
    match err {
        AppError::ValidationError(_) | AppError::BadRequest(_) => QueryOutcome::Invalid,
        AppError::ServiceUnavailable(_) => QueryOutcome::Unavailable,
        _ => QueryOutcome::Error,
    }
}

/// GET /api/posts/near?lat&lng&radius&limit
pub async fn near_posts(
    service: web::Data<PostService>,
    geo: web::Data<GeoConfig>,
    query: web::Query<NearQuery>,
) -> Result<HttpResponse> {
    let start = Instant::now();

    let result = async {
        let lat = parse_number("lat", &query.lat)?;
        let lng = parse_number("lng", &query.lng)?;
        let (lat, lng) = match (lat, lng) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Err(AppError::ValidationError("lat and lng are required".into())),
        };
        let proximity = ProximityQuery::new(
            GeoPoint::new(lat, lng),
            parse_number("radius", &query.radius)?.unwrap_or(geo.default_radius_m),
            parse_limit(&query.limit, geo.default_limit)?,
        )?;
        service.find_near(&proximity).await
    }
    .await;

    match result {
        Ok(items) => {
            record_query("near", QueryOutcome::Ok, start.elapsed(), items.len());
            Ok(HttpResponse::Ok().json(ItemsResponse { items }))
        }
        Err(e) => {
            record_query("near", outcome_of(&e), start.elapsed(), 0);
            Err(e)
        }
    }
}

/// GET /api/posts/by-qr?qr&limit
pub async fn posts_by_qr(
    service: web::Data<PostService>,
    geo: web::Data<GeoConfig>,
    query: web::Query<QrListQuery>,
) -> Result<HttpResponse> {
    let start = Instant::now();

    let result = async {
        let qr = QrQuery::new(
            query.qr.clone().unwrap_or_default(),
            parse_limit(&query.limit, geo.default_limit)?,
        )?;
        service.list_by_qr(&qr).await
    }
    .await;

    match result {
        Ok(items) => {
            record_query("by_qr", QueryOutcome::Ok, start.elapsed(), items.len());
            Ok(HttpResponse::Ok().json(ItemsResponse { items }))
        }
        Err(e) => {
            record_query("by_qr", outcome_of(&e), start.elapsed(), 0);
            Err(e)
        }
    }
}

/// GET /api/posts
pub async fn latest_posts(service: web::Data<PostService>) -> Result<HttpResponse> {
    let start = Instant::now();
    let items = service.list_latest().await?;
    record_query("latest", QueryOutcome::Ok, start.elapsed(), items.len());
    Ok(HttpResponse::Ok().json(ItemsResponse { items }))
}

/// POST /api/posts (multipart)
///
/// Text fields `type, title, description, lat, lng, createdBy, scanId` and an
/// optional file field `media`. A rejected submission never leaves its file
/// behind.
pub async fn create_post(
    service: web::Data<PostService>,
    upload_cfg: web::Data<UploadConfig>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let mut stored: Option<(StoredUpload, PathBuf)> = None;

    let result = create_post_inner(&service, &upload_cfg, payload, &mut stored).await;

    if result.is_err() {
        if let Some((upload, path)) = stored.take() {
            discard_upload(&path).await;
            tracing::debug!(file = %upload.file_name, "discarded upload of rejected post");
        }
    }

    let post = result?;
    Ok(HttpResponse::Created().json(post))
}

async fn create_post_inner(
    service: &PostService,
    upload_cfg: &UploadConfig,
    mut payload: Multipart,
    stored: &mut Option<(StoredUpload, PathBuf)>,
) -> Result<crate::models::Post> {
    let mut draft = PostDraft::default();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        match file_name {
            Some(original) if name == "media" && !original.is_empty() && stored.is_none() => {
                let content_type = field.content_type().map(|m| m.essence_str().to_string());
                let stored_name = stored_file_name(&original);
                let path = upload_cfg.dir.join(&stored_name);

                let mut upload = StoredUpload {
                    file_name: stored_name,
                    size: 0,
                    content_type,
                    original_name: original,
                };
                // registered before writing so a failed write is cleaned up too
                *stored = Some((upload.clone(), path.clone()));

                upload.size = write_field(&mut field, &path, upload_cfg.max_upload_bytes()).await?;
                *stored = Some((upload, path));
            }
            Some(_) => drain_field(&mut field).await?,
            None => {
                let value = read_text_field(&mut field).await?;
                draft.set_field(&name, value);
            }
        }
    }

    let upload = stored.as_ref().map(|(upload, _)| upload.clone());
    let new_post = draft.validate(upload)?;
    service.create_post(&new_post).await
}

/// `<unix millis>_<original name with unsafe runs replaced by "_">`
pub fn stored_file_name(original: &str) -> String {
    let safe = UNSAFE_FILENAME_CHARS.replace_all(original, "_");
    format!("{}_{}", chrono::Utc::now().timestamp_millis(), safe)
}

async fn write_field(field: &mut Field, path: &Path, max_bytes: u64) -> Result<i64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written: u64 = 0;

    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "upload exceeds {}MB limit",
                max_bytes / (1024 * 1024)
            )));
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(i64::try_from(written).unwrap_or(i64::MAX))
}

async fn read_text_field(field: &mut Field) -> Result<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::PayloadTooLarge("form field too large".into()));
        }
        buf.extend_from_slice(&chunk);
    }
    String::from_utf8(buf).map_err(|_| AppError::BadRequest("form fields must be UTF-8".into()))
}

async fn drain_field(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk?;
    }
    Ok(())
}

async fn discard_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove upload");
        }
    }
}
