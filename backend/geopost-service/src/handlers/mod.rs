/// HTTP handlers and route table
pub mod health;
pub mod posts;
pub mod scans;
pub mod uploads;

use crate::error::AppError;
use crate::metrics::serve_metrics;
use actix_web::web;
use serde::Serialize;

pub use posts::{create_post, latest_posts, near_posts, posts_by_qr};
pub use scans::create_scan;

/// List responses are wrapped as `{"items": [...]}`
#[derive(Debug, Serialize)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
}

/// Register every route. Handlers expect `PostService`, `ScanService`,
/// `UploadConfig`, `GeoConfig` and the `SqlitePool` as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(form_config())
        .route("/metrics", web::get().to(serve_metrics))
        .route("/health", web::get().to(health::health_summary))
        .route("/health/ready", web::get().to(health::readiness_summary))
        .service(
            web::scope("/api")
                .service(
                    web::scope("/posts")
                        .route("/near", web::get().to(posts::near_posts))
                        .route("/by-qr", web::get().to(posts::posts_by_qr))
                        .service(
                            web::resource("")
                                .route(web::get().to(posts::latest_posts))
                                .route(web::post().to(posts::create_post)),
                        ),
                )
                .route("/scans", web::post().to(scans::create_scan)),
        )
        .route("/uploads/{file_name}", web::get().to(uploads::serve_upload));
}

/// Malformed JSON bodies get the same error shape as every other failure
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(2 * 1024 * 1024)
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

pub fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}
