//! # 管理员删除保护
//!
//! 纯函数，输入为当前全部管理员标识、操作者与目标，便于脱离 HTTP 单独测试

use crate::error::{PortalError, Result};

pub const ADMIN_NOT_FOUND: &str = "Admin not found";
pub const LAST_ADMIN_MESSAGE: &str = "Cannot delete last admin";
pub const SELF_DELETE_MESSAGE: &str = "Cannot delete currently logged-in admin";

/// 违反管理员保护的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminGuardViolation {
    NotFound,
    LastAdmin,
    SelfDelete,
}

impl AdminGuardViolation {
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NotFound => ADMIN_NOT_FOUND,
            Self::LastAdmin => LAST_ADMIN_MESSAGE,
            Self::SelfDelete => SELF_DELETE_MESSAGE,
        }
    }
}

impl From<AdminGuardViolation> for PortalError {
    fn from(violation: AdminGuardViolation) -> Self {
        match violation {
            AdminGuardViolation::NotFound => Self::not_found("Admin", ""),
            other => Self::validation(other.message()),
        }
    }
}

/// 检查顺序：目标存在 -> 至少保留一名管理员 -> 不能删除自己
pub fn check_admin_deletion<S: AsRef<str>>(
    admin_ids: &[S],
    acting_id: &str,
    target_id: &str,
) -> std::result::Result<(), AdminGuardViolation> {
    if !admin_ids.iter().any(|id| id.as_ref() == target_id) {
        return Err(AdminGuardViolation::NotFound);
    }
    if admin_ids.len() <= 1 {
        return Err(AdminGuardViolation::LastAdmin);
    }
    if acting_id == target_id {
        return Err(AdminGuardViolation::SelfDelete);
    }
    Ok(())
}

/// 转换为应用错误的版本
pub fn guard_admin_deletion<S: AsRef<str>>(
    admin_ids: &[S],
    acting_id: &str,
    target_id: &str,
) -> Result<()> {
    check_admin_deletion(admin_ids, acting_id, target_id).map_err(PortalError::from)
}
