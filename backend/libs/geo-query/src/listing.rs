//! QR-scoped listing: posts attached to scans of a given QR payload.

use crate::error::{GeoError, GeoResult};
use crate::ranking::clamp_limit;
use async_trait::async_trait;

/// Storage collaborator joining posts through scans of a QR payload.
///
/// Implementations return at most `limit` records, newest first.
#[async_trait]
pub trait QrPostSource: Send + Sync {
    type Record: Send;

    async fn posts_by_qr_payload(
        &self,
        qr_payload: &str,
        limit: usize,
    ) -> GeoResult<Vec<Self::Record>>;
}

/// A validated QR listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrQuery {
    payload: String,
    limit: usize,
}

impl QrQuery {
    /// The payload is matched verbatim; only an empty payload is rejected.
    pub fn new(payload: impl Into<String>, limit: i64) -> GeoResult<Self> {
        let payload = payload.into();
        if payload.is_empty() {
            return Err(GeoError::invalid("qr payload is required"));
        }
        let limit = clamp_limit(limit)?;
        Ok(Self { payload, limit })
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// List posts for a QR payload. An unknown payload yields an empty list.
pub async fn find_by_qr_payload<S>(query: &QrQuery, source: &S) -> GeoResult<Vec<S::Record>>
where
    S: QrPostSource + ?Sized,
{
    let mut posts = source
        .posts_by_qr_payload(query.payload(), query.limit())
        .await?;
    posts.truncate(query.limit());
    Ok(posts)
}
