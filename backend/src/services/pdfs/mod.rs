//! # PDF QR Stamping Service
//!
//! *   **`POST /upload-pdf`**: multipart upload with a `file` part. Answers the
//!     registered `{id, file_name, pdf_with_qr}` record.
//! *   **`GET /pdf/{file_name}`**: download of a stored or stamped PDF.
//! *   **`GET /records`**: `{records: [...]}` for this process lifetime.

mod records;
mod serve;
pub mod stamp;
mod upload;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload-pdf", web::post().to(upload::process))
        .route("/pdf/{file_name}", web::get().to(serve::process))
        .route("/records", web::get().to(records::process));
}
