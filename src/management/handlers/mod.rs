//! # HTTP 处理器
//!
//! 只负责提取参数与组装响应，业务逻辑在 `services` 中

pub mod admin_data;
pub mod admin_users;
pub mod auth;
pub mod health;
pub mod mentors;
pub mod profiles;
pub mod sessions;
