//! # 注册与登录服务

use chrono::Utc;
use entity::accounts;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::app::AppContext;
use crate::auth::UserRole;
use crate::error::{Context, PortalError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::types::new_record_id;
use crate::{linfo, lwarn};

use super::shared::clean_text;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// 注册请求
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// 登录请求
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// 不含密码摘要的账户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl From<accounts::Model> for AccountView {
    fn from(account: accounts::Model) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            username: account.username,
        }
    }
}

/// 注册与登录的响应
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AccountView,
}

/// 账户唯一性检查
pub async fn email_taken(db: &sea_orm::DatabaseConnection, email: &str) -> Result<bool> {
    let count = accounts::Entity::find()
        .filter(accounts::Column::Email.eq(email))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// 认证服务
pub struct AuthService<'a> {
    context: &'a AppContext,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(context: &'a AppContext) -> Self {
        Self { context }
    }

    fn respond(&self, account: accounts::Model) -> Result<AuthResponse> {
        let role = UserRole::parse(&account.role).ok_or_else(|| {
            PortalError::internal(format!(
                "account {} has unknown role {}",
                account.id, account.role
            ))
        })?;
        let token = self.context.jwt.generate_token(&account.id, role)?;
        Ok(AuthResponse {
            token,
            user: account.into(),
        })
    }

    /// 注册新账户并签发令牌
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        let db = self.context.db();
        let name = request.name.as_deref().and_then(clean_text);
        let email = request.email.as_deref().and_then(clean_text).map(|e| e.to_lowercase());
        let password = request.password.filter(|p| !p.is_empty());
        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            return Err(PortalError::validation("Name, email and password are required"));
        };

        let role = match request.role.as_deref().and_then(clean_text) {
            None => UserRole::Student,
            Some(raw) => UserRole::parse(&raw.to_lowercase())
                .ok_or_else(|| PortalError::validation_field("Invalid role", "role"))?,
        };
        if role.is_admin() && !self.context.config.auth.allow_admin_registration {
            lwarn!(
                "system",
                LogStage::Auth,
                LogComponent::AuthGate,
                "admin_registration_denied",
                format!("self-registration as admin refused for {email}")
            );
            return Err(PortalError::forbidden("Admin registration is disabled"));
        }

        let username = request
            .username
            .as_deref()
            .and_then(clean_text)
            .map_or_else(|| email.clone(), |u| u.to_lowercase());

        if email_taken(db, &email).await? {
            return Err(PortalError::validation_field("Email already registered", "email"));
        }
        let username_count = accounts::Entity::find()
            .filter(accounts::Column::Username.eq(username.as_str()))
            .count(db)
            .await?;
        if username_count > 0 {
            return Err(PortalError::validation_field("Username already exists", "username"));
        }

        let account = accounts::ActiveModel {
            id: Set(new_record_id()),
            name: Set(name),
            email: Set(email),
            username: Set(Some(username)),
            password_hash: Set(self.context.passwords.hash(&password)?),
            role: Set(role.as_str().to_string()),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(db)
        .await
        .context("Failed to create account")?;

        linfo!(
            account.id,
            LogStage::Auth,
            LogComponent::AuthGate,
            "register",
            format!("registered {} as {}", account.email, account.role)
        );
        self.respond(account)
    }

    /// 校验邮箱与密码并签发令牌
    ///
    /// 邮箱不存在与密码错误返回相同信息
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let email = request
            .email
            .as_deref()
            .and_then(clean_text)
            .map(|e| e.to_lowercase());
        let password = request.password.filter(|p| !p.is_empty());
        let (Some(email), Some(password)) = (email, password) else {
            return Err(PortalError::validation("Missing fields"));
        };

        let account = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email.as_str()))
            .one(self.context.db())
            .await?;
        let Some(account) =
            account.filter(|a| self.context.passwords.verify(&password, &a.password_hash))
        else {
            lwarn!(
                "system",
                LogStage::Auth,
                LogComponent::AuthGate,
                "login_failed",
                format!("failed login for {email}")
            );
            return Err(PortalError::validation(INVALID_CREDENTIALS_MESSAGE));
        };

        linfo!(
            account.id,
            LogStage::Auth,
            LogComponent::AuthGate,
            "login",
            format!("{} logged in", account.email)
        );
        self.respond(account)
    }
}
