//! # 认证模块
//!
//! JWT 令牌签发与校验、密码哈希、角色定义

pub mod jwt;
pub mod password;
pub mod permissions;
pub mod types;
pub mod utils;

pub use jwt::JwtManager;
pub use password::PasswordHasher;
pub use permissions::UserRole;
pub use types::{AuthConfig, Identity, JwtClaims};
pub use utils::AuthUtils;
