use common::model::student::StudentRow;

/// Trims, lowercases and fixes the common "recomended" misspelling.
pub fn normalize_remark(value: &str) -> String {
    value.trim().to_lowercase().replace("recomended", "recommended")
}

pub fn is_recommended(remark: &str) -> bool {
    remark.contains("recommended") && !remark.contains("not")
}

pub fn count_recommended(rows: &[StudentRow]) -> usize {
    rows.iter().filter(|r| is_recommended(&r.remark)).count()
}
