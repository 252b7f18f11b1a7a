use serde::{Deserialize, Serialize};

/// An onboarding certificate request for one school.
///
/// `pdf_path` stays empty until the merge step marks the record `READY`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingCertificate {
    pub id: i64,
    pub record_id: String,
    pub school_name: String,
    pub lga: String,
    pub school_code: String,
    pub js1: i64,
    pub js2: i64,
    pub js3: i64,
    pub ss1: i64,
    pub ss2: i64,
    pub ss3: i64,
    pub total: i64,
    pub teachers: i64,
    pub pdf_path: Option<String>,
    #[serde(rename = "Our_Ref")]
    pub our_ref: Option<i64>,
    pub date_of_issue: Option<String>,
    pub created_at: String,
}
