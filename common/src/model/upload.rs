use crate::model::student::StudentRow;
use serde::{Deserialize, Serialize};

/// The five random path segments that make up a record's capability URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlSegments {
    pub param1: String,
    pub param2: String,
    pub param3: String,
    pub param4: String,
    pub param5: String,
}

impl UrlSegments {
    /// `p1/p2/p3/p4/p5`, without leading or trailing slash.
    pub fn as_path(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.param1, self.param2, self.param3, self.param4, self.param5
        )
    }
}

/// A stored CSV upload. Created once per upload and never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub record_id: String,
    pub school_name: String,
    pub school_code: String,
    pub principal: String,
    pub rows: Vec<StudentRow>,
    #[serde(flatten)]
    pub segments: UrlSegments,
}
