use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One student line of an uploaded results roster.
///
/// WAEC exports always fill the ten named fields. Generic header-driven CSVs
/// fill whichever named columns they carry; any other column lands in `extra`
/// so nothing from the upload is dropped when the row is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRow {
    #[serde(default)]
    pub passport: String,
    #[serde(default)]
    pub lin: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub othername: String,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub year_2026: String,
    #[serde(default)]
    pub year_2025: String,
    #[serde(default)]
    pub year_2024: String,
    /// Normalized at ingestion: trimmed, lowercased, spelling corrected.
    #[serde(default)]
    pub remark: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}
