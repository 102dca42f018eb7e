//! # 表格导入
//!
//! 逗号分隔文本解析、列名回退查找，以及学生导入行的跳过规则

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::{PortalError, Result};
use crate::types::{GENDERS, normalize_choice};

/// 一行数据：表头 -> 单元格
pub type CsvRow = BTreeMap<String, String>;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const PARSE_ERROR: &str = "CSV parse error";

pub const ROLL_KEYS: &[&str] = &[
    "roll",
    "Roll",
    "rollNo",
    "Roll No",
    "Roll Number",
    "Student Id",
    "Student ID",
    "studentId",
    "student_id",
];
pub const NAME_KEYS: &[&str] = &["name", "Name", "Student Name", "studentName", "Full Name"];
pub const EMAIL_KEYS: &[&str] = &["email", "Email", "studentEmail", "Email ID"];
pub const PHONE_KEYS: &[&str] = &[
    "phone",
    "Phone",
    "Student Phone Number",
    "Student Phone",
];
pub const GENDER_KEYS: &[&str] = &["gender", "Gender"];
pub const ADDRESS_KEYS: &[&str] = &["address", "Address"];

pub const DEPARTMENT_KEYS: &[&str] = &[
    "department",
    "Department",
    "dept",
    "Dept",
    "Dept Name",
    "departmentName",
];
pub const PARENT_NAME_KEYS: &[&str] = &[
    "parentName",
    "Parent Name",
    "parent_name",
    "guardianName",
    "Guardian Name",
];
pub const PARENT_PHONE_KEYS: &[&str] = &["parentPhone", "Parent Number", "parent_number"];
pub const PARENT_EMAIL_KEYS: &[&str] = &["parentEmail", "Parent Email"];
pub const PARENT_ADDRESS_KEYS: &[&str] = &["parentAddress", "Parent Address", "address", "Address"];
pub const MENTOR_NAME_KEYS: &[&str] = &[
    "mentorName",
    "Mentor Name",
    "mentor_name",
    "mentor",
    "Mentor",
];

/// 解析逗号分隔文本，首行为表头
///
/// 允许各行列数不一致，单元格去除首尾空白；全空的行忽略。
/// 非 UTF-8 内容等无法解析的输入返回 "CSV parse error"
pub fn parse_csv(data: &[u8]) -> Result<Vec<CsvRow>> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let header = reader
        .headers()
        .map_err(|_| PortalError::validation(PARSE_ERROR))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|_| PortalError::validation(PARSE_ERROR))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(
            header
                .iter()
                .zip(record.iter())
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        );
    }
    Ok(rows)
}

/// 依次查找候选列名，返回第一个非空值
#[must_use]
pub fn pick<'a>(row: &'a CsvRow, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
}

/// 从学生的 `extra_json` 中按候选键取值
#[must_use]
pub fn pick_extra(extra_json: Option<&str>, keys: &[&str]) -> Option<String> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(extra_json?).ok()?;
    keys.iter().filter_map(|key| map.get(*key)).find_map(|value| {
        let text = match value {
            serde_json::Value::String(s) => s.trim().to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    })
}

/// 可写入的学生导入行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
    pub roll: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    /// 未映射到标准字段的列
    pub extra: BTreeMap<String, String>,
}

impl StudentDraft {
    /// 缺少学号或姓名时返回 `None`
    #[must_use]
    pub fn from_row(row: &CsvRow) -> Option<Self> {
        let roll = pick(row, ROLL_KEYS)?.to_string();
        let name = pick(row, NAME_KEYS)?.to_string();

        let canonical: HashSet<&str> = [
            ROLL_KEYS,
            NAME_KEYS,
            EMAIL_KEYS,
            PHONE_KEYS,
            GENDER_KEYS,
            ADDRESS_KEYS,
        ]
        .into_iter()
        .flatten()
        .copied()
        .collect();
        let extra = row
            .iter()
            .filter(|(key, value)| !canonical.contains(key.as_str()) && !value.trim().is_empty())
            .map(|(key, value)| (key.clone(), value.trim().to_string()))
            .collect();

        Some(Self {
            roll,
            name,
            email: pick(row, EMAIL_KEYS).map(str::to_lowercase),
            phone: pick(row, PHONE_KEYS).map(str::to_string),
            gender: pick(row, GENDER_KEYS)
                .and_then(|g| normalize_choice(g, GENDERS))
                .filter(|g| !g.is_empty())
                .map(str::to_string),
            address: pick(row, ADDRESS_KEYS).map(str::to_string),
            extra,
        })
    }

    /// 额外列的 JSON 文本，没有额外列时为 `None`
    #[must_use]
    pub fn extra_json(&self) -> Option<String> {
        if self.extra.is_empty() {
            return None;
        }
        serde_json::to_string(&self.extra).ok()
    }
}

/// 导入结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// 按跳过规则筛选可写入的行
///
/// 缺少学号或姓名的行、学号已存在的行（含同一文件中的重复）均跳过
#[must_use]
pub fn plan_import(
    rows: &[CsvRow],
    existing_rolls: &HashSet<String>) -> (Vec<StudentDraft>, usize,
) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut drafts = Vec::new();
    let mut skipped = 0;

    for row in rows {
        match StudentDraft::from_row(row) {
            Some(draft)
                if !existing_rolls.contains(&draft.roll) && seen.insert(draft.roll.clone()) =>
            {
                drafts.push(draft);
            }
            _ => skipped += 1,
        }
    }
    (drafts, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_csv_quotes_and_line_endings() {
        let text = b"Roll No,Name,Address\r\n\
                     R1,\"Doe, Jane\",\"12 \"\"Main\"\" St\"\r\n\r\n\
                     R2,Bob,\"line1\nline2\"\n";
        let rows = parse_csv(text).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Name"], "Doe, Jane");
        assert_eq!(rows[0]["Address"], "12 \"Main\" St");
        assert_eq!(rows[1]["Roll No"], "R2");
        assert_eq!(rows[1]["Address"], "line1\nline2");
    }

    #[test]
    fn test_parse_csv_without_trailing_newline_and_bom() {
        let rows = parse_csv("\u{feff}roll,name\nR9,Zed".as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["roll"], "R9");
        assert!(parse_csv(b"").unwrap().is_empty());
    }

    #[test]
    fn test_parse_csv_quote_inside_field_is_literal() {
        let rows = parse_csv(b"roll,name,note\nR1,ab\"c,d\n").unwrap();

        assert_eq!(rows[0]["name"], "ab\"c");
        assert_eq!(rows[0]["note"], "d");
    }

    #[test]
    fn test_parse_csv_ragged_rows_and_blank_lines() {
        let rows = parse_csv(b" roll , name \nR1, Ann ,extra\n , \nR2\n").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], "Ann");
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1]["roll"], "R2");
        assert!(!rows[1].contains_key("name"));
    }

    #[test]
    fn test_parse_csv_rejects_invalid_utf8() {
        let err = parse_csv(b"roll,name\nR1,\xff\xfeAnn\n").unwrap_err();

        assert!(matches!(err, PortalError::Validation { .. }));
        assert_eq!(err.client_message(), "CSV parse error");
    }

    #[test]
    fn test_draft_uses_fallback_columns_and_keeps_extras() {
        let rows = parse_csv(
            b"Roll Number,Student Name,Email,Gender,Department,Parent Name\n\
              R1,Ann,ANN@School.Test,female,Computer Science,Mary\n",
        )
        .unwrap();
        let draft = StudentDraft::from_row(&rows[0]).unwrap();

        assert_eq!(draft.roll, "R1");
        assert_eq!(draft.name, "Ann");
        assert_eq!(draft.email.as_deref(), Some("ann@school.test"));
        assert_eq!(draft.gender.as_deref(), Some("Female"));
        assert_eq!(draft.extra.len(), 2);

        let extra = draft.extra_json().unwrap();
        assert_eq!(
            pick_extra(Some(extra.as_str()), DEPARTMENT_KEYS).as_deref(),
            Some("Computer Science")
        );
        assert_eq!(pick_extra(Some(extra.as_str()), PARENT_NAME_KEYS).as_deref(), Some("Mary"));
        assert_eq!(pick_extra(Some(extra.as_str()), MENTOR_NAME_KEYS), None);
    }

    #[test]
    fn test_invalid_gender_is_dropped() {
        let rows = parse_csv(b"roll,name,gender\nR1,Ann,unknown\n").unwrap();
        assert_eq!(StudentDraft::from_row(&rows[0]).unwrap().gender, None);
    }

    #[test]
    fn test_plan_import_skip_rules() {
        let rows =
            parse_csv(b"roll,name\nR1,Ann\nR2,\n,Nobody\nR3,Cat\nR3,Cat again\nR4,Dan\n").unwrap();
        let existing: HashSet<String> = ["R4".to_string()].into_iter().collect();

        let (drafts, skipped) = plan_import(&rows, &existing);
        let rolls: Vec<&str> = drafts.iter().map(|d| d.roll.as_str()).collect();
        assert_eq!(rolls, vec!["R1", "R3"]);
        assert_eq!(skipped, 4);
    }
}
