#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use db_pool::{create_pool, DbConfig};
use geo_query::{GeoPoint, EARTH_RADIUS_M};
use geopost_service::config::{GeoConfig, UploadConfig};
use geopost_service::db::{post_repo, MIGRATOR};
use geopost_service::handlers;
use geopost_service::models::{NewPost, Post, PostKind, Scan};
use geopost_service::services::{PostService, ScanService};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

pub const TOKYO_STATION: GeoPoint = GeoPoint::new(35.681236, 139.767125);

pub struct TestContext {
    pub pool: SqlitePool,
    pub upload_dir: TempDir,
    pub upload: UploadConfig,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_upload_limit_mb(20).await
    }

    pub async fn with_upload_limit_mb(max_upload_mb: u64) -> Self {
        let pool = create_pool(DbConfig::in_memory("geopost-test"))
            .await
            .expect("in-memory pool");
        MIGRATOR.run(&pool).await.expect("run migrations");

        let upload_dir = tempfile::tempdir().expect("upload dir");
        let upload = UploadConfig {
            dir: upload_dir.path().to_path_buf(),
            max_upload_mb,
        };

        Self {
            pool,
            upload_dir,
            upload,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(PostService::new(self.pool.clone())))
            .app_data(web::Data::new(ScanService::new(self.pool.clone())))
            .app_data(web::Data::new(self.upload.clone()))
            .app_data(web::Data::new(GeoConfig::default()))
            .app_data(web::Data::new(self.pool.clone()))
            .configure(handlers::configure)
    }

    pub async fn insert_post(&self, kind: PostKind, at: GeoPoint, scan_id: Option<Uuid>) -> Post {
        post_repo::insert_post(
            &self.pool,
            &NewPost {
                kind,
                title: None,
                description: None,
                location: at,
                created_by: None,
                scan_id,
                upload: None,
            },
        )
        .await
        .expect("insert post")
    }

    pub async fn find_scan(&self, scan_id: Uuid) -> Option<Scan> {
        sqlx::query_as::<_, Scan>(
            "SELECT id, qr_payload, lat, lng, session_id, spot_id, created_at FROM scans WHERE id = ?",
        )
        .bind(scan_id)
        .fetch_optional(&self.pool)
        .await
        .expect("select scan")
    }

    pub fn stored_files(&self) -> Vec<String> {
        std::fs::read_dir(self.upload_dir.path())
            .expect("read upload dir")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect()
    }
}

/// Point `meters` due north of `from`
pub fn north_of(from: GeoPoint, meters: f64) -> GeoPoint {
    GeoPoint::new(from.lat + (meters / EARTH_RADIUS_M).to_degrees(), from.lng)
}

pub const BOUNDARY: &str = "----geopost-test-boundary";

/// Hand-built multipart/form-data body
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }
}
