//! # Roster Upload Service
//!
//! Backend logic for `POST /upload`, the entry point for a school's results roster.
//!
//! ## Workflow
//!
//! 1.  **Multipart Read**: the `file` part is collected in full by `read_file_field`.
//!
//! 2.  **Parsing**: the bytes must be UTF-8. `ingest::parse_roster` detects whether the
//!     file is a WAEC export (metadata rows, then a `#` marker) or a plain header CSV,
//!     and returns the school metadata plus one `StudentRow` per line.
//!
//! 3.  **Storage**: `store::insert_upload` writes the roster to the `uploads` table under a
//!     fresh `{school_code}-{hex}` id and five random path segments.
//!
//! 4.  **HTTP Response**: the JSON body carries the capability URL built from those segments
//!     and the short `/verify/{record_id}` link.
//!
//! Nothing is stored when parsing fails; the client gets `400` with the offending line.

use crate::config::Config;
use crate::error::AppError;
use crate::services::multipart::read_file_field;
use crate::services::uploads::{ingest, store, verify};
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::responses::UploadResponse;

/// Actix web handler for the `POST /upload` endpoint.
///
/// # Arguments
/// * `config` - Shared configuration; `base_url` prefixes the returned capability URL.
/// * `payload` - Multipart body holding the roster under the `file` field.
///
/// # Returns
/// - `200 OK` with an `UploadResponse` JSON payload on success.
/// - `400 Bad Request` when the file is missing, not UTF-8, or not a readable roster.
/// - `500 Internal Server Error` when the database write fails.
pub(crate) async fn process(
    config: web::Data<Config>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let file = read_file_field(payload, "file").await?;
    let text = String::from_utf8(file.bytes)
        .map_err(|_| AppError::BadInput("CSV upload is not valid UTF-8".to_string()))?;

    let roster = ingest::parse_roster(&text)?;
    let record = store::insert_upload(&config, roster)?;
    log::info!(
        "stored upload {} ({} rows) from {}",
        record.record_id,
        record.rows.len(),
        if file.filename.is_empty() { "<unnamed>" } else { file.filename.as_str() }
    );

    Ok(HttpResponse::Ok().json(UploadResponse {
        message: "Upload successful".to_string(),
        index_url: verify::canonical_url(&config.base_url, &record),
        verify_url: format!("/verify/{}", record.record_id),
    }))
}
