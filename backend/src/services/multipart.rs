use crate::error::AppError;
use actix_multipart::Multipart;
use futures_util::StreamExt;

/// An uploaded file part, buffered in memory.
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Drains `payload` and returns the part named `field_name`.
///
/// Other parts are consumed and discarded.
pub async fn read_file_field(
    mut payload: Multipart,
    field_name: &str,
) -> Result<UploadedFile, AppError> {
    let mut found: Option<UploadedFile> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            bytes.extend_from_slice(&chunk?);
        }

        if name.as_deref() == Some(field_name) && found.is_none() {
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                .unwrap_or_default();
            found = Some(UploadedFile { filename, bytes });
        }
    }

    found.ok_or_else(|| AppError::BadInput(format!("missing '{}' field", field_name)))
}
