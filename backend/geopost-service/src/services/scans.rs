use crate::db::scan_repo;
use crate::error::{AppError, Result};
use crate::metrics::record_scan_created;
use crate::models::{Coordinate, CreateScanRequest, Scan};
use geo_query::GeoPoint;
use sqlx::SqlitePool;

/// Records QR scan events
pub struct ScanService {
    pool: SqlitePool,
}

impl ScanService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_scan(&self, req: CreateScanRequest) -> Result<Scan> {
        let (qr_payload, location) = match validate(&req) {
            Ok(valid) => valid,
            Err(e) => {
                record_scan_created(false);
                return Err(e);
            }
        };

        let scan = scan_repo::insert_scan(
            &self.pool,
            qr_payload,
            location,
            req.session_id.as_deref().filter(|v| !v.is_empty()),
            req.spot_id.as_deref().filter(|v| !v.is_empty()),
        )
        .await?;

        record_scan_created(true);
        tracing::info!(scan_id = %scan.id, lat = scan.lat, lng = scan.lng, "scan recorded");
        Ok(scan)
    }
}

fn validate(req: &CreateScanRequest) -> Result<(&str, GeoPoint)> {
    let qr_payload = req.qr_payload.as_deref().unwrap_or_default();
    let lat = coordinate("lat", req.lat.as_ref())?;
    let lng = coordinate("lng", req.lng.as_ref())?;
    let (lat, lng) = match (lat, lng) {
        (Some(lat), Some(lng)) if !qr_payload.is_empty() => (lat, lng),
        _ => {
            return Err(AppError::ValidationError(
                "qrPayload, lat and lng are required".into(),
            ))
        }
    };

    Ok((qr_payload, GeoPoint::try_new(lat, lng)?))
}

fn coordinate(name: &str, value: Option<&Coordinate>) -> Result<Option<f64>> {
    value
        .and_then(Coordinate::value)
        .transpose()
        .map_err(|_| AppError::ValidationError(format!("{} must be a number", name)))
}
