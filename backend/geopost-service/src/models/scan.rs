use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A QR scan event
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub id: Uuid,
    pub qr_payload: String,
    pub lat: f64,
    pub lng: f64,
    pub session_id: Option<String>,
    pub spot_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScanRequest {
    pub qr_payload: Option<String>,
    pub lat: Option<Coordinate>,
    pub lng: Option<Coordinate>,
    pub session_id: Option<String>,
    pub spot_id: Option<String>,
}

/// JSON clients send numbers, form posts send numeric strings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    /// `None` for blank text, `Some(Err)` for text that is not a number.
    pub fn value(&self) -> Option<Result<f64, std::num::ParseFloatError>> {
        match self {
            Coordinate::Number(v) => Some(Ok(*v)),
            Coordinate::Text(raw) => {
                let raw = raw.trim();
                (!raw.is_empty()).then(|| raw.parse())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coordinates_accept_numbers_and_strings() {
        let req: CreateScanRequest = serde_json::from_value(json!({
            "qrPayload": "A",
            "lat": 35.6,
            "lng": "139.7"
        }))
        .unwrap();
        assert_eq!(req.lat, Some(Coordinate::Number(35.6)));
        assert_eq!(req.lng.unwrap().value().unwrap().unwrap(), 139.7);

        assert!(Coordinate::Text("  ".into()).value().is_none());
        assert!(Coordinate::Text("north".into()).value().unwrap().is_err());
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateScanResponse {
    pub id: Uuid,
    pub ok: bool,
}
