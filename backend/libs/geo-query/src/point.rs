//! WGS84 coordinate pair.

use crate::error::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};

/// Latitude/longitude in signed degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude (-90 to 90)
    pub lat: f64,
    /// Longitude (-180 to 180)
    pub lng: f64,
}

impl GeoPoint {
    /// Build a point without validation.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn try_new(lat: f64, lng: f64) -> GeoResult<Self> {
        let point = Self::new(lat, lng);
        point.validate()?;
        Ok(point)
    }

    pub fn validate(&self) -> GeoResult<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(GeoError::invalid("lat and lng must be finite numbers"));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(GeoError::invalid(
                "Invalid latitude: must be between -90 and 90",
            ));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(GeoError::invalid(
                "Invalid longitude: must be between -180 and 180",
            ));
        }
        Ok(())
    }
}
