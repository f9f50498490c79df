//! Geospatial query engine for location-tagged posts
//!
//! Turns a point + radius query into a rectangular pre-filter, asks a storage
//! collaborator for the candidates inside it, then ranks them by exact
//! great-circle distance.
//!
//! ## Pipeline
//!
//! 1. Validate the query ([`ProximityQuery::new`])
//! 2. Compute the bounding box ([`compute_bounding_box`]), split at the antimeridian
//! 3. Fetch at most [`MAX_CANDIDATES`] rows per box from a [`CandidateSource`]
//! 4. Annotate each row with its haversine distance ([`haversine_meters`])
//! 5. Drop rows outside the radius, sort ascending, truncate to the limit
//!
//! ```rust,no_run
//! use geo_query::{find_near, GeoPoint, ProximityQuery};
//! # async fn run<S: geo_query::CandidateSource>(store: &S) -> geo_query::GeoResult<()> {
//! let query = ProximityQuery::new(GeoPoint::new(35.681236, 139.767125), 200.0, 50)?;
//! let nearby = find_near(&query, store).await?;
//! for item in nearby {
//!     println!("{:.1} m", item.distance);
//! }
//! # Ok(())
//! # }
//! ```

mod bbox;
mod distance;
mod error;
mod listing;
mod point;
mod ranking;

pub use bbox::{compute_bounding_box, BoundingBox, METERS_PER_DEGREE, POLE_COS_FLOOR};
pub use distance::{haversine_meters, EARTH_RADIUS_M};
pub use error::{GeoError, GeoResult};
pub use listing::{find_by_qr_payload, QrPostSource, QrQuery};
pub use point::GeoPoint;
pub use ranking::{
    clamp_limit, find_near, merge_newest_first, rank_candidates, CandidateSource,
    DistanceAnnotated, GeoRecord, ProximityQuery,
};

/// Upper bound on rows fetched from storage per bounding box
pub const MAX_CANDIDATES: usize = 500;

/// Upper bound on rows returned to the caller, whatever limit was requested
pub const MAX_LIMIT: usize = 200;
