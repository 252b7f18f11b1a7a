//! Verification pages for stored uploads.
//!
//! `/verify/{record_id}` renders directly by id. The public
//! `/wassce-list/{p1}/{p2}/{p3}/{p4}/{p5}/{record_id}` page additionally
//! requires the five stored segments to match the path exactly; a mismatch
//! answers 404 just like an unknown id.

use crate::config::Config;
use crate::error::{AppError, PageError};
use crate::services::qr;
use crate::services::uploads::remarks::count_recommended;
use crate::services::uploads::store;
use crate::views;
use actix_web::{web, HttpResponse};
use common::model::student::StudentRow;
use common::model::upload::{UploadRecord, UrlSegments};

/// Pixels per QR module on the verification pages.
const QR_MODULE_PX: u32 = 10;

/// Everything the verification templates display.
#[derive(Debug, Clone)]
pub struct VerificationContext {
    pub record_id: String,
    pub school_name: String,
    pub school_code: String,
    pub principal: String,
    pub recommended_count: usize,
    /// Base64 PNG of the QR code encoding `verification_url`.
    pub qr_code: String,
    pub verification_url: String,
    pub segments: UrlSegments,
    pub rows: Vec<StudentRow>,
}

/// `{BASE_URL}/wassce-list/{p1}/{p2}/{p3}/{p4}/{p5}/{record_id}`
pub fn canonical_url(base_url: &str, record: &UploadRecord) -> String {
    format!(
        "{}/wassce-list/{}/{}",
        base_url,
        record.segments.as_path(),
        record.record_id
    )
}

/// Builds the view context. The tally and the QR image are recomputed on
/// every call.
pub fn build_context(config: &Config, record: UploadRecord) -> Result<VerificationContext, AppError> {
    let verification_url = canonical_url(&config.base_url, &record);
    let qr_code = qr::render(&verification_url, QR_MODULE_PX)?.to_base64_png()?;
    Ok(VerificationContext {
        recommended_count: count_recommended(&record.rows),
        qr_code,
        verification_url,
        record_id: record.record_id,
        school_name: record.school_name,
        school_code: record.school_code,
        principal: record.principal,
        segments: record.segments,
        rows: record.rows,
    })
}

pub fn verification_context(config: &Config, record_id: &str) -> Result<VerificationContext, AppError> {
    let record = store::get_upload(config, record_id)?
        .ok_or_else(|| AppError::NotFound("Record not found".to_string()))?;
    build_context(config, record)
}

pub(crate) async fn verify_page(
    config: web::Data<Config>,
    record_id: web::Path<String>,
) -> Result<HttpResponse, PageError> {
    let context = verification_context(&config, &record_id)?;
    let body = views::verification_page(&context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub(crate) async fn wassce_list_page(
    config: web::Data<Config>,
    path: web::Path<(String, String, String, String, String, String)>,
) -> Result<HttpResponse, PageError> {
    let (param1, param2, param3, param4, param5, record_id) = path.into_inner();
    let requested = UrlSegments {
        param1,
        param2,
        param3,
        param4,
        param5,
    };

    let record = store::get_upload(&config, &record_id)?
        .ok_or_else(|| AppError::NotFound("Record not found".to_string()))?;

    if record.segments != requested {
        log::warn!("capability segment mismatch for record {}", record_id);
        return Err(AppError::NotFound("URL segments do not match record".to_string()).into());
    }

    let context = build_context(&config, record)?;
    let body = views::list_page(&context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}
