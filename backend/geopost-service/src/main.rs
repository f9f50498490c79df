use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Context};
use geopost_service::{
    config::Config,
    db::{init_pool, MIGRATOR},
    handlers,
    logging::init_tracing,
    services::{PostService, ScanService},
};

/// Geopost Service
///
/// Stores location-tagged posts and QR scan events in SQLite and serves
/// proximity (`/api/posts/near`), QR-scoped (`/api/posts/by-qr`) and latest
/// listings. Uploaded media is written to `UPLOAD_DIR` and served from
/// `/uploads/<file>`.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().map_err(|e| anyhow!(e))?;
    tracing::info!(
        env = %config.app.env,
        database = %config.database.url,
        upload_dir = %config.upload.dir.display(),
        "Starting geopost-service"
    );

    tokio::fs::create_dir_all(&config.upload.dir)
        .await
        .with_context(|| format!("failed to create upload dir {}", config.upload.dir.display()))?;

    let pool = init_pool(&config.database.url)
        .await
        .context("failed to open database")?;
    tracing::info!(
        migrations = MIGRATOR.iter().count(),
        "Database ready"
    );

    let post_service = web::Data::new(PostService::new(pool.clone()));
    let scan_service = web::Data::new(ScanService::new(pool.clone()));
    let upload_cfg = web::Data::new(config.upload.clone());
    let geo_cfg = web::Data::new(config.geo.clone());
    let pool_data = web::Data::new(pool.clone());

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(post_service.clone())
            .app_data(scan_service.clone())
            .app_data(upload_cfg.clone())
            .app_data(geo_cfg.clone())
            .app_data(pool_data.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    pool.close().await;
    tracing::info!("geopost-service stopped");
    Ok(())
}
