use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedPdfRecord {
    pub id: String,
    /// Client-side name of the uploaded file.
    pub file_name: String,
    /// Public path of the stamped copy, e.g. `/pdf/1a2b3c4d_qr.pdf`.
    pub pdf_with_qr: String,
}
