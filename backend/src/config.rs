//! Process configuration read once from the environment at startup.
//!
//! `DATABASE_URL` is the only required variable; everything else has a
//! default suitable for running the portal locally.

use crate::error::AppError;
use std::path::PathBuf;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite database file.
    pub database_path: PathBuf,
    /// Public origin used when building capability and PDF URLs.
    pub base_url: String,
    pub host: String,
    pub port: u16,
    pub certificates_dir: PathBuf,
    pub pdf_dir: PathBuf,
    pub certificate_template: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| AppError::Config(
                "DATABASE_URL is missing, expected a SQLite path such as data/exam_portal.db"
                    .to_string(),
            ))?;
        let database_path = sqlite_path(&database_url)?;

        let base_url = get("BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            database_path,
            base_url,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            certificates_dir: get("CERTIFICATES_DIR")
                .unwrap_or_else(|| "certificates".to_string())
                .into(),
            pdf_dir: get("PDF_DIR")
                .unwrap_or_else(|| "uploaded_pdfs".to_string())
                .into(),
            certificate_template: get("CERTIFICATE_TEMPLATE")
                .unwrap_or_else(|| "templates/Templatesword.docx".to_string())
                .into(),
        })
    }

    /// Creates the directories generated documents are written to.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.certificates_dir)?;
        std::fs::create_dir_all(&self.pdf_dir)?;
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Accepts `sqlite://path`, `sqlite:path` or a bare file path.
fn sqlite_path(url: &str) -> Result<PathBuf, AppError> {
    let url = url.trim();
    if let Some(rest) = url.strip_prefix("sqlite://") {
        return Ok(PathBuf::from(rest));
    }
    if let Some(rest) = url.strip_prefix("sqlite:") {
        return Ok(PathBuf::from(rest));
    }
    if url.contains("://") {
        return Err(AppError::Config(format!(
            "DATABASE_URL must be a SQLite file path such as \
             sqlite://data/exam_portal.db or data/exam_portal.db, got a {}:// URL",
            url.split("://").next().unwrap_or_default()
        )));
    }
    Ok(PathBuf::from(url))
}
