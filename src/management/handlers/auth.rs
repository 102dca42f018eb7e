//! # 注册与登录处理器

use axum::extract::State;

use crate::error::Result;
use crate::management::response::{ApiResponse, JsonBody};
use crate::management::server::AppState;
use crate::management::services::{AuthResponse, AuthService, LoginRequest, RegisterRequest};

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<ApiResponse<AuthResponse>> {
    let response = AuthService::new(&state).register(request).await?;
    Ok(ApiResponse::Created(response))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>> {
    let response = AuthService::new(&state).login(request).await?;
    Ok(ApiResponse::Ok(response))
}
