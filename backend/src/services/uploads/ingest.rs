//! CSV roster ingestion.
//!
//! Two layouts are accepted. WAEC exports carry school metadata rows
//! (`SCHOOL NAME`, `SCHOOL CODE`, `NAME OF PRINCIPAL`) followed by a `#`
//! header row, after which every line is a student in fixed column order.
//! Anything else is read as a plain header-driven CSV and gets the fallback
//! school identity.

use crate::error::AppError;
use crate::services::uploads::remarks::normalize_remark;
use common::model::student::StudentRow;
use csv::{ReaderBuilder, StringRecord};
use std::collections::BTreeMap;

pub const FALLBACK_SCHOOL_NAME: &str = "CLIMAX SECONDARY SCHOOL";
pub const FALLBACK_SCHOOL_CODE: &str = "C24084";
pub const FALLBACK_PRINCIPAL: &str = "Tolani Ogunbamiji";

/// Columns a WAEC student row must have: `#` plus ten data fields.
const WAEC_COLUMNS: usize = 11;
/// How many leading lines are searched for the WAEC metadata marker.
const LAYOUT_PROBE_LINES: usize = 10;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedRoster {
    pub school_name: String,
    pub school_code: String,
    pub principal: String,
    pub rows: Vec<StudentRow>,
}

pub fn parse_roster(text: &str) -> Result<ParsedRoster, AppError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(AppError::BadInput("uploaded CSV is empty".to_string()));
    }
    if is_waec_layout(text) {
        parse_waec(text)
    } else {
        parse_generic(text)
    }
}

fn is_waec_layout(text: &str) -> bool {
    text.lines()
        .take(LAYOUT_PROBE_LINES)
        .any(|line| line.to_uppercase().contains("SCHOOL NAME"))
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn second_cell(record: &StringRecord) -> String {
    record.get(1).unwrap_or("").trim().to_string()
}

fn parse_waec(text: &str) -> Result<ParsedRoster, AppError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut roster = ParsedRoster::default();
    let mut header_found = false;

    for result in reader.records() {
        let record = result?;
        let first = record.get(0).unwrap_or("").trim();
        if record.is_empty() || (record.len() == 1 && first.is_empty()) {
            continue;
        }

        match first.to_uppercase().as_str() {
            "SCHOOL NAME" => {
                roster.school_name = second_cell(&record);
                continue;
            }
            "SCHOOL CODE" => {
                roster.school_code = second_cell(&record);
                continue;
            }
            "NAME OF PRINCIPAL" => {
                roster.principal = second_cell(&record);
                continue;
            }
            _ => {}
        }

        if first == "#" {
            header_found = true;
            continue;
        }
        if !header_found {
            continue;
        }

        if record.len() < WAEC_COLUMNS {
            return Err(AppError::BadInput(format!(
                "line {}: expected at least {} columns, found {}",
                line_of(&record),
                WAEC_COLUMNS,
                record.len()
            )));
        }

        roster.rows.push(StudentRow {
            passport: record[1].to_string(),
            lin: record[2].to_string(),
            lastname: record[3].to_string(),
            firstname: record[4].to_string(),
            othername: record[5].to_string(),
            sex: record[6].to_string(),
            year_2026: record[7].to_string(),
            year_2025: record[8].to_string(),
            year_2024: record[9].to_string(),
            remark: normalize_remark(&record[10]),
            extra: BTreeMap::new(),
        });
    }

    Ok(roster)
}

fn parse_generic(text: &str) -> Result<ParsedRoster, AppError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row = StudentRow::default();
        for (header, value) in headers.iter().zip(record.iter()) {
            set_field(&mut row, header, value);
        }
        row.remark = normalize_remark(&row.remark);
        rows.push(row);
    }

    Ok(ParsedRoster {
        school_name: FALLBACK_SCHOOL_NAME.to_string(),
        school_code: FALLBACK_SCHOOL_CODE.to_string(),
        principal: FALLBACK_PRINCIPAL.to_string(),
        rows,
    })
}

fn set_field(row: &mut StudentRow, header: &str, value: &str) {
    let value = value.to_string();
    match header.trim().to_lowercase().as_str() {
        "passport" => row.passport = value,
        "lin" => row.lin = value,
        "lastname" => row.lastname = value,
        "firstname" => row.firstname = value,
        "othername" => row.othername = value,
        "sex" => row.sex = value,
        "year_2026" => row.year_2026 = value,
        "year_2025" => row.year_2025 = value,
        "year_2024" => row.year_2024 = value,
        "remark" => row.remark = value,
        _ => {
            row.extra.insert(header.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAEC: &str = "\
WAEC RECOMMENDATION LIST,,,,,,,,,,
SCHOOL NAME,Unity Model College,,,,,,,,,
SCHOOL CODE,U10233,,,,,,,,,
NAME OF PRINCIPAL,Mrs. A. Bello,,,,,,,,,
,,,,,,,,,,
#,PASSPORT,LIN,LASTNAME,FIRSTNAME,OTHERNAME,SEX,2026,2025,2024,REMARK
1,p1.jpg,LIN001,ADEYEMI,Tunde,Kola,M,A1,B2,B3,Recomended
2,p2.jpg,LIN002,OKAFOR,Ada,,F,C4,C5,C6,NOT RECOMMENDED
3,p3.jpg,LIN003,MUSA,Ibrahim,Sani,M,A1,A1,B2, highly recommended
";

    #[test]
    fn waec_layout_reads_metadata_and_rows() {
        let roster = parse_roster(WAEC).unwrap();
        assert_eq!(roster.school_name, "Unity Model College");
        assert_eq!(roster.school_code, "U10233");
        assert_eq!(roster.principal, "Mrs. A. Bello");
        assert_eq!(roster.rows.len(), 3);

        let first = &roster.rows[0];
        assert_eq!(first.passport, "p1.jpg");
        assert_eq!(first.lastname, "ADEYEMI");
        assert_eq!(first.year_2024, "B3");
        assert_eq!(first.remark, "recommended");
        assert_eq!(roster.rows[1].remark, "not recommended");
        assert_eq!(roster.rows[2].remark, "highly recommended");
    }

    #[test]
    fn waec_rows_before_marker_are_ignored() {
        let text = "\
SCHOOL NAME,Hill Top
stray,line,that,is,not,data,,,,,
#,P,L,LN,FN,ON,S,26,25,24,R
1,a,b,c,d,e,f,g,h,i,recommended
";
        let roster = parse_roster(text).unwrap();
        assert_eq!(roster.rows.len(), 1);
        assert_eq!(roster.school_code, "");
    }

    #[test]
    fn short_waec_row_is_bad_input() {
        let text = "\
SCHOOL NAME,Hill Top
#,P,L,LN,FN,ON,S,26,25,24,R
1,a,b,c,d,e,f,g,h,i,recommended
2,a,b,c
";
        let err = parse_roster(text).unwrap_err();
        match err {
            AppError::BadInput(msg) => assert!(msg.starts_with("line 4"), "{}", msg),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn metadata_marker_is_case_insensitive() {
        let text = "school name,Lakeside\n#\n1,a,b,c,d,e,f,g,h,i,Recommended\n";
        let roster = parse_roster(text).unwrap();
        assert_eq!(roster.school_name, "Lakeside");
        assert_eq!(roster.rows.len(), 1);
    }

    #[test]
    fn generic_layout_maps_columns_by_header() {
        let text = "lastname,firstname,sex,remark,house\nOBI,Chike,M,Recomended,Blue\nEZE,Ngozi,F,not recommended,Red\n";
        let roster = parse_roster(text).unwrap();
        assert_eq!(roster.school_name, FALLBACK_SCHOOL_NAME);
        assert_eq!(roster.school_code, FALLBACK_SCHOOL_CODE);
        assert_eq!(roster.principal, FALLBACK_PRINCIPAL);
        assert_eq!(roster.rows.len(), 2);
        assert_eq!(roster.rows[0].lastname, "OBI");
        assert_eq!(roster.rows[0].remark, "recommended");
        assert_eq!(roster.rows[0].extra.get("house").map(String::as_str), Some("Blue"));
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let text = "\u{feff}SCHOOL NAME,Bom School\n#\n1,a,b,c,d,e,f,g,h,i,recommended\n";
        let roster = parse_roster(text).unwrap();
        assert_eq!(roster.school_name, "Bom School");
    }

    #[test]
    fn empty_upload_is_rejected() {
        assert!(matches!(parse_roster(" \n"), Err(AppError::BadInput(_))));
    }
}
