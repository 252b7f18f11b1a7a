use crate::config::Config;
use crate::error::AppError;
use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::web;

/// Actix web handler for the `GET /pdf/{file_name}` endpoint.
///
/// Only bare file names are looked up; anything with a path separator or a
/// leading dot is treated as absent.
///
/// # Arguments
/// * `config` - Shared configuration; files are read from `pdf_dir`.
/// * `file_name` - Name of a stored PDF, extracted from the URL path.
///
/// # Returns
/// - `200 OK` with the PDF as an attachment.
/// - `404 Not Found` with a JSON `{"detail"}` body when no such file exists.
pub(crate) async fn process(
    config: web::Data<Config>,
    file_name: web::Path<String>,
) -> Result<NamedFile, AppError> {
    let file_name = file_name.into_inner();
    if !is_plain_file_name(&file_name) {
        return Err(AppError::NotFound("PDF not found".to_string()));
    }

    let path = config.pdf_dir.join(&file_name);
    if !path.is_file() {
        return Err(AppError::NotFound("PDF not found".to_string()));
    }

    let file = NamedFile::open(&path)?
        .set_content_type(mime_guess::from_ext("pdf").first_or_octet_stream())
        .set_content_disposition(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        });
    Ok(file)
}

/// Rejects anything that could leave `PDF_DIR`.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
        && !name.starts_with('.')
}
