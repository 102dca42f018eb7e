//! # 配置管理器
//!
//! 读取 TOML 配置文件并应用环境变量覆盖

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::AppConfig;
use crate::auth::types::DEV_JWT_SECRET;
use crate::error::{PortalError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

/// 指定配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "CAMPUS_PORTAL_CONFIG";

/// 参与覆盖的环境变量
const OVERRIDE_KEYS: [&str; 5] = ["DATABASE_URL", "JWT_SECRET", "PORT", "HOST", "LOG_LEVEL"];

/// 配置管理器
pub struct ConfigManager {
    /// 当前配置
    config: Arc<AppConfig>,
    /// 配置来源文件
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 创建配置管理器
    ///
    /// 优先使用 `CAMPUS_PORTAL_CONFIG` 指定的文件，否则读取
    /// `config/config.{RUST_ENV}.toml`，文件不存在时使用内置默认值
    pub fn new() -> Result<Self> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            return Self::from_file(path);
        }

        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let config_file = PathBuf::from(format!("config/config.{env_name}.toml"));
        if config_file.exists() {
            return Self::from_file(config_file);
        }

        lwarn!(
            "system",
            LogStage::Startup,
            LogComponent::Config,
            "config_file_missing",
            format!("配置文件不存在: {}, 使用默认配置", config_file.display())
        );
        Self::from_parts(AppConfig::default(), None, &Self::build_env_overrides())
    }

    /// 从指定文件创建配置管理器
    pub fn from_file(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();
        let config = Self::load_config_file(config_path)?;
        Self::from_parts(
            config,
            Some(config_path.to_path_buf()),
            &Self::build_env_overrides(),
        )
    }

    /// 使用给定配置与覆盖项构建
    pub fn from_parts(
        mut config: AppConfig,
        source: Option<PathBuf>,
        overrides: &HashMap<String, String>,
    ) -> Result<Self> {
        Self::apply_env_overrides(&mut config, overrides)?;
        config.validate()?;

        if config.auth.jwt_secret == DEV_JWT_SECRET {
            lwarn!(
                "system",
                LogStage::Startup,
                LogComponent::Config,
                "dev_jwt_secret",
                "正在使用开发环境默认JWT密钥，请通过 JWT_SECRET 覆盖"
            );
        }

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Config,
            "config_loaded",
            format!(
                "配置加载完成: source={}, overrides={}",
                source
                    .as_ref()
                    .map_or_else(|| "defaults".to_string(), |p| p.display().to_string()),
                overrides.len()
            )
        );

        Ok(Self {
            config: Arc::new(config),
            source,
        })
    }

    /// 获取当前配置
    #[must_use]
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// 配置来源文件
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 加载配置文件
    fn load_config_file(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(PortalError::config(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }

        let config_content = std::fs::read_to_string(path).map_err(|e| {
            PortalError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
        })?;

        toml::from_str(&config_content).map_err(|e| {
            PortalError::config_with_source(
                format!("TOML解析失败 - 配置文件: {}", path.display()),
                e,
            )
        })
    }

    /// 收集环境变量覆盖项
    #[must_use]
    pub fn build_env_overrides() -> HashMap<String, String> {
        OVERRIDE_KEYS
            .iter()
            .filter_map(|key| env::var(key).ok().map(|value| ((*key).to_string(), value)))
            .collect()
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(
        config: &mut AppConfig,
        overrides: &HashMap<String, String>,
    ) -> Result<()> {
        if let Some(url) = overrides.get("DATABASE_URL") {
            config.database.url.clone_from(url);
        }
        if let Some(secret) = overrides.get("JWT_SECRET") {
            config.auth.jwt_secret.clone_from(secret);
        }
        if let Some(port) = overrides.get("PORT") {
            config.server.port = port.parse().map_err(|e| {
                PortalError::config_with_source(format!("无效的 PORT 环境变量: {port}"), e)
            })?;
        }
        if let Some(host) = overrides.get("HOST") {
            config.server.host.clone_from(host);
        }
        if let Some(level) = overrides.get("LOG_LEVEL") {
            config.logging.level.clone_from(level);
        }
        Ok(())
    }
}
