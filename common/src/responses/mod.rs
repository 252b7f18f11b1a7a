use crate::model::pdf_record::UploadedPdfRecord;
use serde::{Deserialize, Serialize};

/// Answer of `POST /upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    /// Absolute capability URL of the public list page.
    pub index_url: String,
    /// Relative URL of the direct verification page.
    pub verify_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsResponse {
    pub records: Vec<UploadedPdfRecord>,
}

/// JSON error body used by every API route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}
