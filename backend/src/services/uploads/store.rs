//! Persistence of uploaded rosters in the `uploads` table.

use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::services::uploads::ingest::ParsedRoster;
use common::model::student::StudentRow;
use common::model::upload::{UploadRecord, UrlSegments};
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

/// A fresh id or segment set is drawn after each constraint violation.
const MAX_INSERT_ATTEMPTS: usize = 5;

/// Draws the five capability segments: 3 digits, 7 lowercase letters,
/// 1 to 10, 3 digits, 2 digits.
pub fn generate_url_segments<R: Rng>(rng: &mut R) -> UrlSegments {
    let letters: String = (0..7)
        .map(|_| char::from(b'a' + rng.gen_range(0..26u8)))
        .collect();
    UrlSegments {
        param1: rng.gen_range(100..=999).to_string(),
        param2: letters,
        param3: rng.gen_range(1..=10).to_string(),
        param4: rng.gen_range(100..=999).to_string(),
        param5: rng.gen_range(10..=99).to_string(),
    }
}

/// `{school_code}-{6 hex}`.
fn new_record_id(school_code: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}-{}", school_code, &hex[..6])
}

pub fn insert_upload(config: &Config, roster: ParsedRoster) -> Result<UploadRecord, AppError> {
    let conn = db::open(config)?;
    insert_with(&conn, roster, &mut rand::thread_rng(), new_record_id)
}

/// Insert loop behind [`insert_upload`]. Segments come from `rng` and ids
/// from `next_id`, both redrawn after a unique-constraint violation.
fn insert_with<R: Rng>(
    conn: &Connection,
    roster: ParsedRoster,
    rng: &mut R,
    mut next_id: impl FnMut(&str) -> String,
) -> Result<UploadRecord, AppError> {
    let rows_json = serde_json::to_string(&roster.rows)?;

    for attempt in 1..=MAX_INSERT_ATTEMPTS {
        let record_id = next_id(&roster.school_code);
        let segments = generate_url_segments(rng);

        let inserted = conn.execute(
            "INSERT INTO uploads
             (record_id, school_name, school_code, principal, rows,
              param1, param2, param3, param4, param5)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record_id,
                roster.school_name,
                roster.school_code,
                roster.principal,
                rows_json,
                segments.param1,
                segments.param2,
                segments.param3,
                segments.param4,
                segments.param5,
            ],
        );

        match inserted {
            Ok(_) => {
                return Ok(UploadRecord {
                    record_id,
                    school_name: roster.school_name,
                    school_code: roster.school_code,
                    principal: roster.principal,
                    rows: roster.rows,
                    segments,
                })
            }
            Err(e) if db::is_constraint_violation(&e) => {
                log::warn!(
                    "upload id or capability collision on attempt {}, retrying",
                    attempt
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(
        "could not allocate a unique record id".to_string(),
    ))
}

pub fn get_upload(config: &Config, record_id: &str) -> Result<Option<UploadRecord>, AppError> {
    let conn = db::open(config)?;
    let found = conn
        .query_row(
            "SELECT record_id, school_name, school_code, principal, rows,
                    param1, param2, param3, param4, param5
             FROM uploads WHERE record_id = ?1",
            params![record_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    UrlSegments {
                        param1: row.get(5)?,
                        param2: row.get(6)?,
                        param3: row.get(7)?,
                        param4: row.get(8)?,
                        param5: row.get(9)?,
                    },
                ))
            },
        )
        .optional()?;

    match found {
        Some((record_id, school_name, school_code, principal, rows_json, segments)) => {
            let rows: Vec<StudentRow> = serde_json::from_str(&rows_json)?;
            Ok(Some(UploadRecord {
                record_id,
                school_name,
                school_code,
                principal,
                rows,
                segments,
            }))
        }
        None => Ok(None),
    }
}
