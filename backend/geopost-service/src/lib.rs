/// Geopost Service Library
///
/// Location-tagged posts: clients scan a QR code, take a geolocation fix and
/// attach image, 3D model or text posts to that spot. The service stores posts
/// and scan events in SQLite and answers proximity and QR-scoped queries through
/// the `geo-query` engine.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Post and scan records
/// - `services`: Business logic layer
/// - `db`: SQLite repositories and migrations
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors and the `/metrics` handler
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

/// Label used for pool metrics and health responses
pub const SERVICE_NAME: &str = "geopost-service";
