//! # 数据库模块
//!
//! 数据库连接、迁移管理和管理员初始化

use std::time::Duration;

use chrono::Utc;
use entity::accounts;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;

use crate::auth::{PasswordHasher, UserRole};
use crate::config::DatabaseConfig;
use crate::error::{Context, PortalError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::types::new_record_id;
use crate::{lerror, linfo, lwarn};

/// 默认管理员邮箱
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@campus.local";
/// 默认管理员密码
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin123!";
/// 默认管理员名称
pub const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// 初始化数据库连接
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "connect",
        format!("正在连接数据库: {}", config.url)
    );

    // 对于SQLite数据库，确保数据库文件的目录和文件存在
    config.ensure_database_path()?;

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .map_err(|e| PortalError::database_with_source("数据库连接失败", e))?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "connected",
        "数据库连接成功"
    );
    Ok(db)
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "migrate",
        "开始运行数据库迁移..."
    );

    match ::migration::Migrator::up(db, None).await {
        Ok(()) => {
            linfo!(
                "system",
                LogStage::Startup,
                LogComponent::Database,
                "migrate",
                "数据库迁移完成"
            );
            Ok(())
        }
        Err(e) => {
            lerror!(
                "system",
                LogStage::Startup,
                LogComponent::Database,
                "migrate",
                format!("数据库迁移失败: {e}")
            );
            Err(PortalError::database_with_source("数据库迁移失败", e))
        }
    }
}

/// 检查数据库状态
pub async fn check_database_status(db: &DatabaseConnection) -> Result<usize> {
    let pending = ::migration::Migrator::get_pending_migrations(db)
        .await
        .context("读取迁移状态失败")?;

    if pending.is_empty() {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Database,
            "status",
            "所有迁移都已应用"
        );
    } else {
        lwarn!(
            "system",
            LogStage::Startup,
            LogComponent::Database,
            "status",
            format!("有 {} 个待应用的迁移", pending.len())
        );
    }

    Ok(pending.len())
}

/// 管理员初始化结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSetup {
    Created,
    /// 已存在的账户被提升为管理员并重置密码
    Promoted,
}

/// 确保存在指定邮箱的管理员账户
pub async fn ensure_default_admin(
    db: &DatabaseConnection,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
    name: &str,
) -> Result<(AdminSetup, accounts::Model)> {
    let email = email.trim().to_lowercase();
    crate::ensure_valid!(!email.is_empty() && !password.is_empty(), "Missing fields");

    let digest = hasher.hash(password)?;
    let existing = accounts::Entity::find()
        .filter(accounts::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;

    let (outcome, model) = if let Some(account) = existing {
        let mut active: accounts::ActiveModel = account.into();
        active.role = Set(UserRole::Admin.as_str().to_string());
        active.password_hash = Set(digest);
        (AdminSetup::Promoted, active.update(db).await?)
    } else {
        let active = accounts::ActiveModel {
            id: Set(new_record_id()),
            name: Set(name.to_string()),
            email: Set(email.clone()),
            username: Set(Some(email.clone())),
            password_hash: Set(digest),
            role: Set(UserRole::Admin.as_str().to_string()),
            created_at: Set(Utc::now().naive_utc()),
        };
        (AdminSetup::Created, active.insert(db).await?)
    };

    linfo!(
        "system",
        LogStage::Maintenance,
        LogComponent::Admin,
        "setup_admin",
        format!("管理员账户就绪: {} ({:?})", model.email, outcome)
    );
    Ok((outcome, model))
}
