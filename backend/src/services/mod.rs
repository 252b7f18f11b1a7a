//! HTTP services of the portal, one sub-module per concern.
//!
//! - `uploads`: CSV roster ingestion and verification pages.
//! - `certificates`: onboarding certificate records and DOCX rendering.
//! - `pdfs`: QR stamping of arbitrary PDFs.

pub mod certificates;
mod files;
mod multipart;
pub mod pdfs;
pub mod qr;
pub mod uploads;

use actix_web::web;

/// Registers every route of the portal.
pub fn configure(cfg: &mut web::ServiceConfig) {
    uploads::configure_routes(cfg);
    certificates::configure_routes(cfg);
    pdfs::configure_routes(cfg);
}
