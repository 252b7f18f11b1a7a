use crate::config::Config;
use crate::error::AppError;
use crate::services::certificates::store;
use actix_web::{web, HttpResponse};
use common::responses::MessageResponse;

/// `POST /merge/{record_id}`: marks the certificate `READY`.
///
/// No PDF is produced; only the status transition is recorded.
pub(crate) async fn process(
    config: web::Data<Config>,
    record_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    if !store::mark_ready(&config, &record_id)? {
        return Err(AppError::NotFound("Certificate not found".to_string()));
    }
    log::info!("certificate {} marked {}", record_id, store::READY);
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Merged".to_string(),
    }))
}
