//! 应用上下文（DI 容器）
//!
//! 统一持有跨模块共享的服务实例，便于在测试中注入替身实现。

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::{JwtManager, PasswordHasher};
use crate::config::AppConfig;
use crate::error::Result;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub db: Arc<DatabaseConnection>,
    pub jwt: Arc<JwtManager>,
    pub passwords: PasswordHasher,
}

impl AppContext {
    /// 按配置构建令牌服务与密码哈希器
    pub fn new(config: Arc<AppConfig>, db: Arc<DatabaseConnection>) -> Result<Self> {
        let jwt = Arc::new(JwtManager::new(Arc::new(config.auth.clone()))?);
        let passwords = PasswordHasher::new(config.auth.bcrypt_cost);
        Ok(Self {
            config,
            db,
            jwt,
            passwords,
        })
    }

    /// 数据库连接引用
    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
