//! # Roster Upload Service
//!
//! CSV rosters of student results are parsed (`ingest`), stored with a
//! five-segment capability URL (`store`) and shown on verification pages
//! (`verify`).
//!
//! ## Registered Routes:
//!
//! *   **`POST /upload`**: multipart upload with a `file` part. Answers
//!     `{message, index_url, verify_url}`.
//! *   **`GET /verify/{record_id}`**: verification page by id.
//! *   **`GET /wassce-list/{p1}/{p2}/{p3}/{p4}/{p5}/{record_id}`**: public list
//!     page, 404 unless all five segments match the stored ones.

pub mod ingest;
pub mod remarks;
pub mod store;
mod upload;
pub mod verify;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/upload", web::post().to(upload::process))
        .route("/verify/{record_id}", web::get().to(verify::verify_page))
        .route(
            "/wassce-list/{p1}/{p2}/{p3}/{p4}/{p5}/{record_id}",
            web::get().to(verify::wassce_list_page),
        );
}
