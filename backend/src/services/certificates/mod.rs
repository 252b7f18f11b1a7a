//! # Onboarding Certificate Service
//!
//! Certificate records are created from a browser form, listed on the
//! dashboard, rendered to DOCX from a fixed template on demand and marked
//! ready by the merge step.
//!
//! ## Registered Routes:
//!
//! *   **`GET /`** and **`GET /certificates-list`**: dashboard.
//! *   **`POST /generate-certificate`**: form submission, 303 to the list.
//! *   **`POST /merge/{record_id}`**: status flip to `READY`.
//! *   **`GET /print/{record_id}`**: DOCX download, built on first request.

mod create;
pub mod docx;
mod list;
mod merge;
mod print;
pub mod store;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(list::process))
        .route("/certificates-list", web::get().to(list::process))
        .route("/generate-certificate", web::post().to(create::process))
        .route("/merge/{record_id}", web::post().to(merge::process))
        .route("/print/{record_id}", web::get().to(print::process));
}
