//! # 账户管理处理器

use axum::extract::{Extension, Path, State};
use entity::accounts;

use crate::auth::Identity;
use crate::error::Result;
use crate::management::response::{ApiResponse, message};
use crate::management::server::AppState;
use crate::management::services::{AccountService, UserStats};

/// `GET /admin/users`
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<accounts::Model>>> {
    Ok(ApiResponse::Ok(AccountService::new(&state).list_users().await?))
}

/// `GET /admin/users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<accounts::Model>> {
    Ok(ApiResponse::Ok(AccountService::new(&state).get_user(&id).await?))
}

/// `DELETE /admin/users/{id}`
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    AccountService::new(&state)
        .delete_user(&identity.account_id, &id)
        .await?;
    Ok(message("User removed"))
}

/// `GET /admin/stats`
pub async fn user_stats(State(state): State<AppState>) -> Result<ApiResponse<UserStats>> {
    Ok(ApiResponse::Ok(AccountService::new(&state).stats().await?))
}
