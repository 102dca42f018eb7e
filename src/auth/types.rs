//! # 认证类型定义

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::permissions::UserRole;

/// 开发环境默认密钥，仅用于本地启动
pub const DEV_JWT_SECRET: &str = "campus-portal-dev-secret-change-me";

/// 令牌签发方与受众
pub const TOKEN_ISSUER: &str = "campus-portal";

/// 认证配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT 签名密钥
    pub jwt_secret: String,
    /// 令牌有效期（秒）
    pub token_ttl: i64,
    pub issuer: String,
    pub audience: String,
    /// bcrypt 计算成本
    pub bcrypt_cost: u32,
    /// 是否允许通过注册接口创建管理员
    pub allow_admin_registration: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl: 7 * 24 * 3600,
            issuer: TOKEN_ISSUER.to_string(),
            audience: TOKEN_ISSUER.to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            allow_admin_registration: false,
        }
    }
}

/// JWT 载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// 账户标识
    pub sub: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    /// 令牌唯一标识
    pub jti: String,
}

impl JwtClaims {
    #[must_use]
    pub fn new(account_id: &str, role: UserRole, config: &AuthConfig) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: account_id.to_string(),
            role,
            iat: now,
            exp: now + config.token_ttl,
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// 转换为请求上下文中的身份
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            account_id: self.sub.clone(),
            role: self.role,
        }
    }
}

/// 通过认证的请求身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: String,
    pub role: UserRole,
}

impl Identity {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
