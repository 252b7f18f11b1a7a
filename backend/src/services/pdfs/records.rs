use crate::registry::state::PdfRegistry;
use actix_web::{web, HttpResponse};
use common::responses::RecordsResponse;

/// `GET /records`: every PDF stamped since the process started.
pub(crate) async fn process(registry: web::Data<PdfRegistry>) -> HttpResponse {
    HttpResponse::Ok().json(RecordsResponse {
        records: registry.all().await,
    })
}
