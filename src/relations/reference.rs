//! # 引用输入分类
//!
//! 表单提交的交叉引用字段可能是内部标识、自然键文本、`null` 或缺省，
//! 在解析之前先归类为 [`RefInput`]。

use serde_json::Value;
use std::fmt;

use crate::types::is_record_id;

/// 归类后的引用输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefInput {
    /// 字段未出现在请求中，保持原值
    Absent,
    /// `null` 或空白字符串，清空原值
    Null,
    /// 语法上合法的内部标识，直接信任
    RawRef(String),
    /// 需要按自然键查找的文本
    NaturalKey(String),
}

impl RefInput {
    /// 从可选文本归类，供导入与同步等非 JSON 路径使用
    #[must_use]
    pub fn from_text(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None => Self::Absent,
            Some("") => Self::Null,
            Some(text) if is_record_id(text) => Self::RawRef(text.to_string()),
            Some(text) => Self::NaturalKey(text.to_string()),
        }
    }
}

/// 对请求中的原始值分类
///
/// 外层 `None` 表示字段缺省，`Some(None)` 表示显式 `null`。
/// 对象取其 `_id`，数字按文本处理，其余类型视为无效。
pub fn classify(raw: Option<Option<&Value>>) -> Result<RefInput, String> {
    let Some(value) = raw else {
        return Ok(RefInput::Absent);
    };
    match value {
        None | Some(Value::Null) => Ok(RefInput::Null),
        Some(Value::String(text)) => Ok(RefInput::from_text(Some(text))),
        Some(Value::Number(number)) => Ok(RefInput::from_text(Some(&number.to_string()))),
        Some(Value::Object(map)) => match map.get("_id") {
            Some(inner) => classify(Some(Some(inner))),
            None => Err("reference object has no _id".to_string()),
        },
        Some(other) => Err(format!("unsupported reference value: {other}")),
    }
}

/// 引用目标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Department,
    Parent,
    Faculty,
    Student,
    Course,
}

/// 可用于查找的自然键字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NaturalKeyField {
    Code,
    Name,
    /// 院系历史文本编号
    LegacyId,
    Pid,
    /// 家长编号的历史字段
    LegacyParentId,
    Fid,
    Roll,
}

impl NaturalKeyField {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Name => "name",
            Self::LegacyId => "id",
            Self::Pid => "pid",
            Self::LegacyParentId => "parentId",
            Self::Fid => "fid",
            Self::Roll => "roll",
        }
    }
}

impl fmt::Display for NaturalKeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ReferenceKind {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Department => "Department",
            Self::Parent => "Parent",
            Self::Faculty => "Faculty",
            Self::Student => "Student",
            Self::Course => "Course",
        }
    }

    /// 按优先级排列的自然键字段
    #[must_use]
    pub const fn natural_keys(&self) -> &'static [NaturalKeyField] {
        match self {
            Self::Department => &[
                NaturalKeyField::Code,
                NaturalKeyField::Name,
                NaturalKeyField::LegacyId,
            ],
            Self::Parent => &[
                NaturalKeyField::Pid,
                NaturalKeyField::LegacyParentId,
                NaturalKeyField::Name,
            ],
            Self::Faculty => &[NaturalKeyField::Fid, NaturalKeyField::Name],
            Self::Student => &[NaturalKeyField::Roll, NaturalKeyField::Name],
            Self::Course => &[NaturalKeyField::Code, NaturalKeyField::Name],
        }
    }

    /// 在计数数组中的位置
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Department => 0,
            Self::Parent => 1,
            Self::Faculty => 2,
            Self::Student => 3,
            Self::Course => 4,
        }
    }

    /// 错误信息里列出的期望字段，如 "code, name or id"
    #[must_use]
    pub fn expected_fields(&self) -> String {
        let names: Vec<&str> = self.natural_keys().iter().map(NaturalKeyField::as_str).collect();
        match names.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
            Some((last, _)) => (*last).to_string(),
            None => String::new(),
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 引用解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotProvided,
    ExplicitNull,
    Resolved(String),
    Error(String),
}

impl Resolution {
    /// 转换为补丁值：外层 `None` 表示不修改，`Some(None)` 表示清空
    ///
    /// 错误结果也映射为不修改，调用方应先检查 [`Resolution::error`]
    #[must_use]
    pub fn into_patch(self) -> Option<Option<String>> {
        match self {
            Self::NotProvided | Self::Error(_) => None,
            Self::ExplicitNull => Some(None),
            Self::Resolved(id) => Some(Some(id)),
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn resolved(&self) -> Option<&str> {
        match self {
            Self::Resolved(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_absent_and_null() {
        assert_eq!(classify(None).unwrap(), RefInput::Absent);
        assert_eq!(classify(Some(None)).unwrap(), RefInput::Null);
        assert_eq!(classify(Some(Some(&json!("   ")))).unwrap(), RefInput::Null);
        assert_eq!(classify(Some(Some(&Value::Null))).unwrap(), RefInput::Null);
    }

    #[test]
    fn test_classify_raw_ref_and_natural_key() {
        let id = json!("65a4c3f0aa11bb22cc33dd44");
        assert_eq!(
            classify(Some(Some(&id))).unwrap(),
            RefInput::RawRef("65a4c3f0aa11bb22cc33dd44".to_string())
        );
        assert_eq!(
            classify(Some(Some(&json!("  CSE ")))).unwrap(),
            RefInput::NaturalKey("CSE".to_string())
        );
        assert_eq!(
            classify(Some(Some(&json!(101)))).unwrap(),
            RefInput::NaturalKey("101".to_string())
        );
    }

    #[test]
    fn test_classify_populated_object() {
        let populated = json!({"_id": "65a4c3f0aa11bb22cc33dd44", "name": "CS"});
        assert_eq!(
            classify(Some(Some(&populated))).unwrap(),
            RefInput::RawRef("65a4c3f0aa11bb22cc33dd44".to_string())
        );
        assert!(classify(Some(Some(&json!({"name": "CS"})))).is_err());
        assert!(classify(Some(Some(&json!(true)))).is_err());
        assert!(classify(Some(Some(&json!(["CSE"])))).is_err());
    }

    #[test]
    fn test_expected_fields() {
        assert_eq!(ReferenceKind::Department.expected_fields(), "code, name or id");
        assert_eq!(ReferenceKind::Faculty.expected_fields(), "fid or name");
    }

    #[test]
    fn test_into_patch() {
        assert_eq!(Resolution::NotProvided.into_patch(), None);
        assert_eq!(Resolution::ExplicitNull.into_patch(), Some(None));
        assert_eq!(
            Resolution::Resolved("x".to_string()).into_patch(),
            Some(Some("x".to_string()))
        );
    }
}
