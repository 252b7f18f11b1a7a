use crate::config::Config;
use crate::error::AppError;
use crate::registry::state::PdfRegistry;
use crate::services::files::write_atomic;
use crate::services::multipart::read_file_field;
use crate::services::pdfs::stamp;
use crate::services::qr;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::pdf_record::UploadedPdfRecord;
use std::path::Path;
use uuid::Uuid;

/// Pixels per QR module in the stamped image.
const QR_MODULE_PX: u32 = 4;

/// Actix web handler for the `POST /upload-pdf` endpoint.
///
/// The original is written as `{id}.pdf` and the stamped copy as `{id}_qr.pdf`.
/// The QR code encodes the absolute URL of the stamped copy. When stamping
/// fails the original is removed again and nothing is registered.
///
/// # Returns
/// - `200 OK` with the `UploadedPdfRecord` JSON payload.
/// - `400 Bad Request` when the upload is not a PDF with at least one page.
pub(crate) async fn process(
    config: web::Data<Config>,
    registry: web::Data<PdfRegistry>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let file = read_file_field(payload, "file").await?;
    let id = Uuid::new_v4().simple().to_string()[..8].to_string();
    let stamped_name = format!("{}_qr.pdf", id);
    let original_path = config.pdf_dir.join(format!("{}.pdf", id));
    let stamped_path = config.pdf_dir.join(&stamped_name);

    write_atomic(&original_path, &file.bytes)?;

    let pdf_url = format!("{}/pdf/{}", config.base_url, stamped_name);
    let stamped = qr::render(&pdf_url, QR_MODULE_PX)
        .and_then(|qr| stamp::stamp_first_page(&file.bytes, &qr))
        .and_then(|bytes| write_atomic(&stamped_path, &bytes));
    if let Err(e) = stamped {
        discard(&original_path);
        return Err(e);
    }

    let record = UploadedPdfRecord {
        id,
        file_name: file.filename,
        pdf_with_qr: format!("/pdf/{}", stamped_name),
    };
    log::info!("stamped {} as {}", record.file_name, record.pdf_with_qr);
    registry.register(record.clone()).await;
    Ok(HttpResponse::Ok().json(record))
}

/// Removes a file left behind by a failed stamp. Returns false, with a
/// warning, when it could not be removed.
fn discard(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("could not remove {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discard_reports_whether_the_file_went_away() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orphan.pdf");
        std::fs::write(&path, b"%PDF-1.5").unwrap();

        assert!(discard(&path));
        assert!(!path.exists());
        assert!(!discard(&path));
        assert!(!discard(dir.path()));
        assert!(dir.path().is_dir());
    }
}
