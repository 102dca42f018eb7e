//! # 账户管理服务
//!
//! 管理员账户的增删（受最后一名管理员保护），以及全部账户的查看与统计

use chrono::Utc;
use entity::accounts;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use super::auth::{AccountView, email_taken};
use super::shared::{clean_text, find_or_404};
use crate::app::AppContext;
use crate::auth::UserRole;
use crate::error::{Context, PortalError, Result};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use crate::relations::guard_admin_deletion;
use crate::types::new_record_id;

/// 新建管理员请求
#[derive(Debug, Default, Deserialize)]
pub struct CreateAdminRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// 按角色统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub students: u64,
    pub mentors: u64,
    pub counselors: u64,
    pub parents: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: u64,
    pub by_role: RoleCounts,
}

/// 当前全部管理员的标识
async fn admin_ids(db: &DatabaseConnection) -> Result<Vec<String>> {
    Ok(accounts::Entity::find()
        .select_only()
        .column(accounts::Column::Id)
        .filter(accounts::Column::Role.eq(UserRole::Admin.as_str()))
        .into_tuple::<String>()
        .all(db)
        .await?)
}

/// 账户管理服务
pub struct AccountService<'a> {
    context: &'a AppContext,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(context: &'a AppContext) -> Self {
        Self { context }
    }

    fn db(&self) -> &DatabaseConnection {
        self.context.db()
    }

    /// 管理员列表，仅 `{id,name,email,role}`
    pub async fn list_admins(&self) -> Result<Vec<AccountView>> {
        let admins = accounts::Entity::find()
            .filter(accounts::Column::Role.eq(UserRole::Admin.as_str()))
            .order_by_asc(accounts::Column::CreatedAt)
            .all(self.db())
            .await
            .context("Failed to list admins")?;
        Ok(admins
            .into_iter()
            .map(|a| AccountView {
                username: None,
                ..AccountView::from(a)
            })
            .collect())
    }

    pub async fn create_admin(&self, request: CreateAdminRequest) -> Result<AccountView> {
        let name = request.name.as_deref().and_then(clean_text);
        let email = request.email.as_deref().and_then(clean_text).map(|e| e.to_lowercase());
        let password = request.password.filter(|p| !p.is_empty());
        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(PortalError::validation("Missing fields"));
        };
        if email_taken(self.db(), &email).await? {
            return Err(PortalError::validation_field("Email already exists", "email"));
        }

        let account = accounts::ActiveModel {
            id: Set(new_record_id()),
            name: Set(name),
            email: Set(email.clone()),
            username: Set(Some(email)),
            password_hash: Set(self.context.passwords.hash(&password)?),
            role: Set(UserRole::Admin.as_str().to_string()),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(self.db())
        .await
        .context("Failed to create admin")?;

        linfo!(
            account.id,
            LogStage::Db,
            LogComponent::Admin,
            "create_admin",
            format!("admin {} created", account.email)
        );
        Ok(AccountView {
            username: None,
            ..account.into()
        })
    }

    /// 删除管理员：目标存在 -> 保留至少一名 -> 不能删除自己
    pub async fn delete_admin(&self, acting_id: &str, target_id: &str) -> Result<()> {
        let admins = admin_ids(self.db()).await?;
        guard_admin_deletion(&admins, acting_id, target_id)?;
        accounts::Entity::delete_by_id(target_id.to_string())
            .exec(self.db())
            .await
            .context("Failed to delete admin")?;

        linfo!(
            acting_id,
            LogStage::Db,
            LogComponent::Admin,
            "delete_admin",
            format!("admin {target_id} deleted by {acting_id}")
        );
        Ok(())
    }

    /// 全部账户，新注册的在前
    pub async fn list_users(&self) -> Result<Vec<accounts::Model>> {
        accounts::Entity::find()
            .order_by_desc(accounts::Column::CreatedAt)
            .all(self.db())
            .await
            .context("Failed to list users")
    }

    pub async fn get_user(&self, id: &str) -> Result<accounts::Model> {
        find_or_404::<accounts::Entity>(self.db(), id, "User").await
    }

    /// 删除账户，目标为管理员时同样受保护
    pub async fn delete_user(&self, acting_id: &str, id: &str) -> Result<()> {
        let account = self.get_user(id).await?;
        if account.role == UserRole::Admin.as_str() {
            return self.delete_admin(acting_id, id).await;
        }
        accounts::Entity::delete_by_id(account.id)
            .exec(self.db())
            .await
            .context("Failed to delete user")?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<UserStats> {
        let count_role = |role: UserRole| {
            accounts::Entity::find()
                .filter(accounts::Column::Role.eq(role.as_str()))
                .count(self.db())
        };
        Ok(UserStats {
            total_users: accounts::Entity::find().count(self.db()).await?,
            by_role: RoleCounts {
                students: count_role(UserRole::Student).await?,
                mentors: count_role(UserRole::Mentor).await?,
                counselors: count_role(UserRole::Counselor).await?,
                parents: count_role(UserRole::Parent).await?,
            },
        })
    }
}
