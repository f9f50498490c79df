use chrono::{DateTime, Utc};
use geo_query::{GeoPoint, GeoRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// What a post carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Image,
    Model,
    Text,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Image => "image",
            PostKind::Model => "model",
            PostKind::Text => "text",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(PostKind::Image),
            "model" => Ok(PostKind::Model),
            "text" => Ok(PostKind::Text),
            other => Err(format!("type must be one of image, model, text (got '{}')", other)),
        }
    }
}

/// A stored post, serialized with the camelCase field names clients expect
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "post_type")]
    pub kind: PostKind,
    pub title: Option<String>,
    pub description: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub media_url: Option<String>,
    pub thumb_url: Option<String>,
    pub size: Option<i64>,
    pub content_type: Option<String>,
    pub original_name: Option<String>,
    pub created_by: Option<String>,
    pub scan_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl GeoRecord for Post {
    type Id = Uuid;
    type Recency = DateTime<Utc>;

    fn id(&self) -> Uuid {
        self.id
    }

    fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    fn recency(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// File written to the upload directory for a post
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    /// Name inside the upload directory
    pub file_name: String,
    pub size: i64,
    pub content_type: Option<String>,
    pub original_name: String,
}

impl StoredUpload {
    pub fn media_url(&self) -> String {
        format!("/uploads/{}", self.file_name)
    }
}

/// Validated input for a new post
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub kind: PostKind,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: GeoPoint,
    pub created_by: Option<String>,
    pub scan_id: Option<Uuid>,
    pub upload: Option<StoredUpload>,
}
