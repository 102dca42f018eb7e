//! # 用户角色定义
//!
//! 定义系统中的账户角色

use serde::{Deserialize, Serialize};
use std::fmt;

/// 用户角色枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// 学生
    Student,
    /// 导师
    Mentor,
    /// 家长
    Parent,
    /// 辅导员
    Counselor,
    /// 管理员
    Admin,
}

impl UserRole {
    /// 全部角色
    pub const ALL: [Self; 5] = [
        Self::Student,
        Self::Mentor,
        Self::Parent,
        Self::Counselor,
        Self::Admin,
    ];

    /// 获取角色的字符串表示
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Mentor => "mentor",
            Self::Parent => "parent",
            Self::Counselor => "counselor",
            Self::Admin => "admin",
        }
    }

    /// 从字符串解析角色
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == s)
    }

    /// 检查是否为管理员
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid user role: {s}"))
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_string_conversion() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("Admin"), None);
        assert_eq!(UserRole::parse("regular_user"), None);
    }

    #[test]
    fn test_is_admin() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Counselor.is_admin());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Mentor).unwrap(), "\"mentor\"");
        let role: UserRole = serde_json::from_str("\"parent\"").unwrap();
        assert_eq!(role, UserRole::Parent);
    }

    #[test]
    fn test_from_str_error() {
        let err = "janitor".parse::<UserRole>().unwrap_err();
        assert_eq!(err, "Invalid user role: janitor");
    }
}
