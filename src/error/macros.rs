//! # 错误处理宏

/// 快速创建错误的宏
///
/// `portal_err!(validation, "Roll already exists")`
/// `portal_err!(internal, "token encode failed: {}", e)`
#[macro_export]
macro_rules! portal_err {
    ($ctor:ident, $msg:expr) => {
        $crate::error::PortalError::$ctor($msg)
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        $crate::error::PortalError::$ctor(format!($fmt, $($arg)*))
    };
}

/// 确保条件成立，否则返回验证错误
#[macro_export]
macro_rules! ensure_valid {
    ($cond:expr, $msg:expr) => {
        if !($cond) {
            return Err($crate::error::PortalError::validation($msg));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::error::PortalError::validation(format!($fmt, $($arg)*)));
        }
    };
}
