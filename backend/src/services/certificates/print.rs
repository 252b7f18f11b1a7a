use crate::config::Config;
use crate::error::AppError;
use crate::services::certificates::{docx, store};
use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web;

/// Actix web handler for the `GET /print/{record_id}` endpoint.
///
/// The DOCX in `CERTIFICATES_DIR` is the cache: it is rendered from the
/// template on the first request and served unchanged afterwards, so later
/// edits to the template do not affect certificates already printed.
///
/// # Arguments
/// * `config` - Shared configuration with the template and output paths.
/// * `record_id` - The certificate's 8-character id, extracted from the URL path.
///
/// # Returns
/// - `200 OK` with `Certificate_{record_id}.docx` as an attachment.
/// - `404 Not Found` when no certificate has that id.
/// - `500 Internal Server Error` when the template is missing or cannot be rendered.
pub(crate) async fn process(
    config: web::Data<Config>,
    record_id: web::Path<String>,
) -> Result<NamedFile, AppError> {
    let record_id = record_id.into_inner();
    let cert = store::get_certificate(&config, &record_id)?
        .ok_or_else(|| AppError::NotFound("Certificate not found".to_string()))?;

    let path = docx::word_path(&config, &record_id);
    if !path.exists() {
        docx::build_certificate_word(&config, &cert)?;
    }

    let file = NamedFile::open(&path)?
        .set_content_type(mime_guess::from_ext("docx").first_or_octet_stream())
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(format!(
                "Certificate_{}.docx",
                record_id
            ))],
        });
    Ok(file)
}
