//! # 应用配置结构定义

use serde::{Deserialize, Serialize};

use crate::auth::types::AuthConfig;
use crate::error::{PortalError, Result};

/// 应用主配置结构
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP 服务配置
    pub server: ServerConfig,
    /// 数据库配置
    pub database: super::DatabaseConfig,
    /// 认证配置
    pub auth: AuthConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
    /// API前缀
    pub api_prefix: String,
    /// 允许的CORS源地址，`*` 表示任意
    pub cors_origins: Vec<String>,
    /// 前端静态文件目录
    pub static_dir: Option<String>,
    /// 请求体上限（字节），主要约束导入文件大小
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            api_prefix: "/api".to_string(),
            cors_origins: vec!["*".to_string()],
            static_dir: None,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// 监听地址字符串
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(PortalError::config("无效的服务器端口: 0"));
        }

        if !self.server.api_prefix.starts_with('/') {
            return Err(PortalError::config(format!(
                "API前缀必须以 / 开头: {}",
                self.server.api_prefix
            )));
        }

        if self.database.url.is_empty() {
            return Err(PortalError::config("数据库URL不能为空"));
        }

        if self.database.max_connections == 0 {
            return Err(PortalError::config("数据库最大连接数必须大于0"));
        }

        if self.auth.jwt_secret.len() < 16 {
            return Err(PortalError::config("JWT密钥长度至少为16字节"));
        }

        if self.auth.token_ttl <= 0 {
            return Err(PortalError::config("令牌有效期必须大于0"));
        }

        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            return Err(PortalError::config(format!(
                "bcrypt cost 必须在 4..=31 之间: {}",
                self.auth.bcrypt_cost
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.auth.token_ttl, 7 * 24 * 3600);
        assert!(!config.auth.allow_admin_registration);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8088

            [auth]
            jwt_secret = "a-much-longer-test-secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.api_prefix, "/api");
        assert_eq!(config.auth.jwt_secret, "a-much-longer-test-secret");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validation_rejects_short_secret() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.auth.bcrypt_cost = 2;
        assert!(config.validate().is_err());
    }
}
