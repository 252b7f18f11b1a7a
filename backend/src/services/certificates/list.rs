use crate::config::Config;
use crate::error::PageError;
use crate::services::certificates::store;
use crate::views;
use actix_web::{web, HttpResponse};

/// Dashboard listing every certificate, newest first. Served on `/` and
/// `/certificates-list`.
pub(crate) async fn process(config: web::Data<Config>) -> Result<HttpResponse, PageError> {
    let records = store::list_certificates(&config)?;
    let body = views::dashboard(&records)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}
