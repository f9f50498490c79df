/// Data models for geopost-service
///
/// - Post: a location-tagged image, 3D model or text entry
/// - Scan: a decoded QR payload captured at a location
mod post;
mod scan;

pub use post::{NewPost, Post, PostKind, StoredUpload};
pub use scan::{Coordinate, CreateScanRequest, CreateScanResponse, Scan};
