//! Process-lifetime registry of stamped PDF uploads.
//!
//! Records live only as long as the process; the stamped files themselves stay
//! on disk under `PDF_DIR`. The registry is cloned into every actix worker and
//! all clones share one list.

use common::model::pdf_record::UploadedPdfRecord;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct PdfRegistry {
    records: Arc<RwLock<Vec<UploadedPdfRecord>>>,
}

impl PdfRegistry {
    pub async fn register(&self, record: UploadedPdfRecord) {
        self.records.write().await.push(record);
    }

    /// Snapshot in upload order.
    pub async fn all(&self) -> Vec<UploadedPdfRecord> {
        self.records.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> UploadedPdfRecord {
        UploadedPdfRecord {
            id: id.to_string(),
            file_name: format!("{}.pdf", id),
            pdf_with_qr: format!("/pdf/{}_qr.pdf", id),
        }
    }

    #[actix_web::test]
    async fn clones_share_records() {
        let registry = PdfRegistry::default();
        let worker = registry.clone();
        worker.register(record("aaaa1111")).await;
        registry.register(record("bbbb2222")).await;

        let ids: Vec<String> = registry.all().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["aaaa1111", "bbbb2222"]);
    }
}
