use serde::{Deserialize, Deserializer};

/// Form payload of `POST /generate-certificate`.
///
/// Count fields default to 0 when absent or left blank in the browser form.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateForm {
    pub school_name: String,
    pub lga: String,
    pub school_code: String,
    #[serde(default, deserialize_with = "count_field")]
    pub js1: i64,
    #[serde(default, deserialize_with = "count_field")]
    pub js2: i64,
    #[serde(default, deserialize_with = "count_field")]
    pub js3: i64,
    #[serde(default, deserialize_with = "count_field")]
    pub ss1: i64,
    #[serde(default, deserialize_with = "count_field")]
    pub ss2: i64,
    #[serde(default, deserialize_with = "count_field")]
    pub ss3: i64,
    #[serde(default, deserialize_with = "count_field")]
    pub total: i64,
    #[serde(default, deserialize_with = "count_field")]
    pub teachers: i64,
}

fn count_field<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse::<i64>().map_err(serde::de::Error::custom)
}
