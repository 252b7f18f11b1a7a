//! Persistence of onboarding certificates in `onboarding_certificates`.

use crate::config::Config;
use crate::db;
use crate::error::AppError;
use common::model::certificate::OnboardingCertificate;
use common::requests::CertificateForm;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

const MAX_INSERT_ATTEMPTS: usize = 5;

/// Status written by the merge step.
pub const READY: &str = "READY";

const COLUMNS: &str = "id, record_id, school_name, lga, school_code,
    js1, js2, js3, ss1, ss2, ss3, total, teachers,
    pdf_path, our_ref, date_of_issue, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<OnboardingCertificate> {
    Ok(OnboardingCertificate {
        id: row.get(0)?,
        record_id: row.get(1)?,
        school_name: row.get(2)?,
        lga: row.get(3)?,
        school_code: row.get(4)?,
        js1: row.get(5)?,
        js2: row.get(6)?,
        js3: row.get(7)?,
        ss1: row.get(8)?,
        ss2: row.get(9)?,
        ss3: row.get(10)?,
        total: row.get(11)?,
        teachers: row.get(12)?,
        pdf_path: row.get(13)?,
        our_ref: row.get(14)?,
        date_of_issue: row.get(15)?,
        created_at: row.get(16)?,
    })
}

fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Inserts one certificate per submission. `Our_Ref` is the row id and the
/// issue date is today.
pub fn insert_certificate(
    config: &Config,
    form: &CertificateForm,
) -> Result<OnboardingCertificate, AppError> {
    let mut conn = db::open(config)?;
    insert_with(&mut conn, form, new_record_id)
}

/// Insert loop behind [`insert_certificate`], with the id source supplied.
///
/// Each attempt runs the INSERT and the `our_ref` UPDATE in one transaction,
/// so a row never exists without its reference. An id collision rolls the
/// attempt back and draws a fresh id, up to `MAX_INSERT_ATTEMPTS` times.
fn insert_with(
    conn: &mut Connection,
    form: &CertificateForm,
    mut next_id: impl FnMut() -> String,
) -> Result<OnboardingCertificate, AppError> {
    for attempt in 1..=MAX_INSERT_ATTEMPTS {
        let record_id = next_id();
        let tx = conn.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO onboarding_certificates
             (record_id, school_name, lga, school_code,
              js1, js2, js3, ss1, ss2, ss3, total, teachers, date_of_issue)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, date('now'))",
            params![
                record_id,
                form.school_name.trim(),
                form.lga.trim(),
                form.school_code.trim(),
                form.js1,
                form.js2,
                form.js3,
                form.ss1,
                form.ss2,
                form.ss3,
                form.total,
                form.teachers,
            ],
        );

        match inserted {
            Ok(_) => {
                let id = tx.last_insert_rowid();
                tx.execute(
                    "UPDATE onboarding_certificates SET our_ref = ?1 WHERE id = ?1",
                    params![id],
                )?;
                let cert = find(&tx, &record_id)?.ok_or_else(|| {
                    AppError::Internal(format!("certificate {} vanished after insert", record_id))
                })?;
                tx.commit()?;
                return Ok(cert);
            }
            Err(e) if db::is_constraint_violation(&e) => {
                log::warn!("certificate id collision on attempt {}, retrying", attempt);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(
        "could not allocate a unique certificate id".to_string(),
    ))
}

fn find(conn: &Connection, record_id: &str) -> Result<Option<OnboardingCertificate>, AppError> {
    let sql = format!(
        "SELECT {} FROM onboarding_certificates WHERE record_id = ?1",
        COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![record_id], from_row)
        .optional()?)
}

pub fn get_certificate(
    config: &Config,
    record_id: &str,
) -> Result<Option<OnboardingCertificate>, AppError> {
    let conn = db::open(config)?;
    find(&conn, record_id)
}

/// Every certificate, newest first.
pub fn list_certificates(config: &Config) -> Result<Vec<OnboardingCertificate>, AppError> {
    let conn = db::open(config)?;
    let sql = format!(
        "SELECT {} FROM onboarding_certificates ORDER BY created_at DESC, id DESC",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map([], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Sets `pdf_path` to `READY`. Returns false when no such record exists.
pub fn mark_ready(config: &Config, record_id: &str) -> Result<bool, AppError> {
    let conn = db::open(config)?;
    let updated = conn.execute(
        "UPDATE onboarding_certificates SET pdf_path = ?1 WHERE record_id = ?2",
        params![READY, record_id],
    )?;
    Ok(updated > 0)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::testing::temp_config;

    pub fn form(school_name: &str) -> CertificateForm {
        CertificateForm {
            school_name: school_name.to_string(),
            lga: "Ikeja".to_string(),
            school_code: "C24084".to_string(),
            js1: 120,
            js2: 110,
            js3: 100,
            ss1: 90,
            ss2: 80,
            ss3: 70,
            total: 570,
            teachers: 35,
        }
    }

    #[test]
    fn insert_assigns_id_reference_and_date() {
        let (_dir, config) = temp_config();
        let cert = insert_certificate(&config, &form("Climax Secondary School")).unwrap();
        assert_eq!(cert.record_id.len(), 8);
        assert!(cert.record_id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(cert.our_ref, Some(cert.id));
        assert_eq!(cert.date_of_issue.as_deref().map(str::len), Some(10));
        assert_eq!(cert.pdf_path, None);
        assert_eq!(cert.total, 570);
    }

    #[test]
    fn same_school_can_be_submitted_twice() {
        let (_dir, config) = temp_config();
        let a = insert_certificate(&config, &form("Twice High")).unwrap();
        let b = insert_certificate(&config, &form("Twice High")).unwrap();
        assert_ne!(a.record_id, b.record_id);
        assert_eq!(list_certificates(&config).unwrap().len(), 2);
    }

    #[test]
    fn listing_is_newest_first() {
        let (_dir, config) = temp_config();
        let first = insert_certificate(&config, &form("First")).unwrap();
        let second = insert_certificate(&config, &form("Second")).unwrap();
        let listed = list_certificates(&config).unwrap();
        assert_eq!(listed[0].record_id, second.record_id);
        assert_eq!(listed[1].record_id, first.record_id);
    }

    #[test]
    fn id_collision_draws_a_fresh_id() {
        let (_dir, config) = temp_config();
        let mut conn = db::open(&config).unwrap();
        let mut ids = vec!["cafe0002", "cafe0001", "cafe0001"];
        insert_with(&mut conn, &form("First"), || ids.pop().unwrap().to_string()).unwrap();

        let second = insert_with(&mut conn, &form("Second"), || ids.pop().unwrap().to_string())
            .unwrap();
        assert_eq!(second.record_id, "cafe0002");
        assert_eq!(second.our_ref, Some(second.id));
        assert!(ids.is_empty());
        assert_eq!(list_certificates(&config).unwrap().len(), 2);
    }

    #[test]
    fn stuck_id_source_gives_up_without_partial_rows() {
        let (_dir, config) = temp_config();
        let mut conn = db::open(&config).unwrap();
        insert_with(&mut conn, &form("Holder"), || "cafe0001".to_string()).unwrap();

        let mut calls = 0;
        let result = insert_with(&mut conn, &form("Blocked"), || {
            calls += 1;
            "cafe0001".to_string()
        });
        assert!(matches!(result, Err(AppError::Internal(msg)) if msg.contains("unique certificate id")));
        assert_eq!(calls, MAX_INSERT_ATTEMPTS);

        let listed = list_certificates(&config).unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed.iter().all(|c| c.our_ref == Some(c.id)));
    }

    #[test]
    fn mark_ready_flips_status() {
        let (_dir, config) = temp_config();
        let cert = insert_certificate(&config, &form("Ready College")).unwrap();
        assert!(mark_ready(&config, &cert.record_id).unwrap());
        let reloaded = get_certificate(&config, &cert.record_id).unwrap().unwrap();
        assert_eq!(reloaded.pdf_path.as_deref(), Some(READY));
        assert!(!mark_ready(&config, "deadbeef").unwrap());
    }
}
