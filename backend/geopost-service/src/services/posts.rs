/// Post service - creation, proximity and QR-scoped listings
use crate::db::{post_repo, PostStore};
use crate::error::{AppError, Result};
use crate::metrics::record_post_created;
use crate::models::{NewPost, Post, PostKind, StoredUpload};
use geo_query::{find_by_qr_payload, find_near, DistanceAnnotated, GeoPoint, ProximityQuery, QrQuery};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Size of the "latest posts" listing
pub const LATEST_LIMIT: i64 = 20;

pub struct PostService {
    pool: SqlitePool,
    store: PostStore,
}

impl PostService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            store: PostStore::new(pool.clone()),
            pool,
        }
    }

    /// Posts within the query radius, nearest first, annotated with distance
    pub async fn find_near(&self, query: &ProximityQuery) -> Result<Vec<DistanceAnnotated<Post>>> {
        Ok(find_near(query, &self.store).await?)
    }

    /// Posts attached to scans of the query payload, newest first
    pub async fn list_by_qr(&self, query: &QrQuery) -> Result<Vec<Post>> {
        Ok(find_by_qr_payload(query, &self.store).await?)
    }

    pub async fn list_latest(&self) -> Result<Vec<Post>> {
        Ok(post_repo::list_latest(&self.pool, LATEST_LIMIT).await?)
    }

    pub async fn create_post(&self, new_post: &NewPost) -> Result<Post> {
        let post = post_repo::insert_post(&self.pool, new_post).await?;

        record_post_created(post.kind.as_str(), post.media_url.is_some());
        tracing::info!(
            post_id = %post.id,
            kind = %post.kind,
            lat = post.lat,
            lng = post.lng,
            scan_id = ?post.scan_id,
            media = post.media_url.is_some(),
            "post created"
        );

        Ok(post)
    }
}

/// Raw text fields of a post submission, as received
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub kind: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub created_by: Option<String>,
    pub scan_id: Option<String>,
}

impl PostDraft {
    /// Assign a multipart text field; unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: String) {
        let slot = match name {
            "type" => &mut self.kind,
            "title" => &mut self.title,
            "description" => &mut self.description,
            "lat" => &mut self.lat,
            "lng" => &mut self.lng,
            "createdBy" => &mut self.created_by,
            "scanId" => &mut self.scan_id,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Validate the draft. Empty optional fields become `None`.
    pub fn validate(self, upload: Option<StoredUpload>) -> Result<NewPost> {
        let kind = match non_empty(self.kind) {
            Some(kind) => kind.parse::<PostKind>().map_err(AppError::ValidationError)?,
            None => return Err(AppError::ValidationError("type, lat and lng are required".into())),
        };

        let lat = parse_coordinate(self.lat.as_deref())?;
        let lng = parse_coordinate(self.lng.as_deref())?;
        let location = GeoPoint::try_new(lat, lng)?;

        let scan_id = match non_empty(self.scan_id) {
            Some(raw) => Some(
                Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::ValidationError("scanId must be a UUID".into()))?,
            ),
            None => None,
        };

        Ok(NewPost {
            kind,
            title: non_empty(self.title),
            description: non_empty(self.description),
            location,
            created_by: non_empty(self.created_by),
            scan_id,
            upload,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_coordinate(raw: Option<&str>) -> Result<f64> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(AppError::ValidationError("type, lat and lng are required".into()));
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::ValidationError("lat and lng must be finite numbers".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: &str, lat: &str, lng: &str) -> PostDraft {
        let mut draft = PostDraft::default();
        draft.set_field("type", kind.into());
        draft.set_field("lat", lat.into());
        draft.set_field("lng", lng.into());
        draft
    }

    #[test]
    fn test_valid_draft() {
        let mut d = draft("text", "35.681236", " 139.767125 ");
        d.set_field("title", "Hello".into());
        d.set_field("description", String::new());
        d.set_field("unknown", "ignored".into());

        let post = d.validate(None).unwrap();
        assert_eq!(post.kind, PostKind::Text);
        assert_eq!(post.title.as_deref(), Some("Hello"));
        assert_eq!(post.description, None);
        assert_eq!(post.location, GeoPoint::new(35.681236, 139.767125));
        assert_eq!(post.scan_id, None);
    }

    #[test]
    fn test_rejects_bad_type() {
        assert!(matches!(
            draft("video", "1", "2").validate(None),
            Err(AppError::ValidationError(_))
        ));
        assert!(draft("", "1", "2").validate(None).is_err());
    }

    #[test]
    fn test_rejects_bad_coordinates() {
        for (lat, lng) in [("", "2"), ("abc", "2"), ("NaN", "2"), ("1", "inf"), ("91", "0"), ("0", "-181")] {
            assert!(
                matches!(draft("image", lat, lng).validate(None), Err(AppError::ValidationError(_))),
                "accepted lat={} lng={}",
                lat,
                lng
            );
        }
    }

    #[test]
    fn test_scan_id_must_be_uuid() {
        let mut d = draft("model", "0", "0");
        d.set_field("scanId", "not-a-uuid".into());
        assert!(d.validate(None).is_err());

        let id = Uuid::new_v4();
        let mut d = draft("model", "0", "0");
        d.set_field("scanId", id.to_string());
        assert_eq!(d.validate(None).unwrap().scan_id, Some(id));
    }
}
