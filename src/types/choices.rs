//! # 枚举文本取值

use crate::error::{PortalError, Result};

/// 性别，空字符串表示未填写
pub const GENDERS: &[&str] = &["Male", "Female", "Other", ""];
/// 出勤状态
pub const ATTENDANCE_STATUSES: &[&str] = &["Present", "Absent"];
/// 辅导会话状态
pub const SESSION_STATUSES: &[&str] = &["scheduled", "completed", "cancelled"];

/// 校验取值属于允许集合
pub fn check_choice(field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&value) {
        return Ok(());
    }
    let listed: Vec<&str> = allowed.iter().copied().filter(|v| !v.is_empty()).collect();
    Err(PortalError::validation_field(
        format!("Invalid {field}: expected one of {}", listed.join(", ")),
        field,
    ))
}

/// 忽略大小写归一化到允许集合中的写法，无法识别时返回 `None`
#[must_use]
pub fn normalize_choice(value: &str, allowed: &[&'static str]) -> Option<&'static str> {
    let value = value.trim();
    allowed.iter().copied().find(|v| v.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_choice() {
        assert!(check_choice("gender", "Female", GENDERS).is_ok());
        assert!(check_choice("gender", "", GENDERS).is_ok());
        let err = check_choice("status", "Late", ATTENDANCE_STATUSES).unwrap_err();
        assert_eq!(err.field(), Some("status"));
        assert_eq!(err.client_message(), "Invalid status: expected one of Present, Absent");
    }

    #[test]
    fn test_normalize_choice() {
        assert_eq!(normalize_choice(" male ", GENDERS), Some("Male"));
        assert_eq!(normalize_choice("unknown", GENDERS), None);
        assert_eq!(normalize_choice("COMPLETED", SESSION_STATUSES), Some("completed"));
    }
}
