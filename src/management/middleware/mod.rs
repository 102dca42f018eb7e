//! # 管理服务器中间件
//!
//! 请求 ID、认证闸门与角色闸门

pub mod auth;
pub mod request_id;

pub use auth::{ADMIN_ONLY_MESSAGE, NO_TOKEN_MESSAGE, auth_gate, require_admin};
pub use request_id::{RequestId, request_id_middleware};
