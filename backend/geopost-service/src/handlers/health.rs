use crate::SERVICE_NAME;
use actix_web::{web, HttpResponse};
use db_pool::acquire_with_metrics;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

/// GET /health - process liveness, `{ok, ts}` with ts in unix millis
pub async fn health_summary() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "ok": true,
        "ts": chrono::Utc::now().timestamp_millis(),
    }))
}

async fn check_sqlite(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut conn = acquire_with_metrics(pool, SERVICE_NAME).await?;
    sqlx::query("SELECT 1").execute(&mut *conn).await.map(|_| ())
}

/// GET /health/ready - 503 when the database cannot be reached
pub async fn readiness_summary(pool: web::Data<SqlitePool>) -> HttpResponse {
    let mut checks = HashMap::new();

    let start = Instant::now();
    let result = check_sqlite(pool.get_ref()).await;
    let latency_ms = Some(start.elapsed().as_millis() as u64);

    let sqlite_check = match result {
        Ok(()) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "SQLite connection successful".to_string(),
            latency_ms,
        },
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("SQLite connection failed: {}", e),
                latency_ms,
            }
        }
    };
    let status = sqlite_check.status;
    checks.insert("sqlite".to_string(), sqlite_check);

    let ready = status == ComponentStatus::Healthy;
    let response = ReadinessResponse {
        ready,
        status,
        checks,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
