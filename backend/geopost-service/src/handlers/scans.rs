use crate::error::Result;
use crate::models::{CreateScanRequest, CreateScanResponse};
use crate::services::ScanService;
use actix_web::{web, Either, HttpResponse};

/// POST /api/scans (JSON or urlencoded form)
pub async fn create_scan(
    service: web::Data<ScanService>,
    payload: Either<web::Json<CreateScanRequest>, web::Form<CreateScanRequest>>,
) -> Result<HttpResponse> {
    let req = match payload {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let scan = service.create_scan(req).await?;

    Ok(HttpResponse::Created().json(CreateScanResponse {
        id: scan.id,
        ok: true,
    }))
}
