//! # 认证中间件
//!
//! 从请求头中提取JWT，验证并将其解析的身份注入到请求扩展中。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::request_id::RequestId;
use crate::auth::{AuthUtils, Identity};
use crate::error::{PortalError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::management::server::AppState;
use crate::{ldebug, lwarn};

/// 缺少令牌时的提示
pub const NO_TOKEN_MESSAGE: &str = "No token, authorization denied";
/// 非管理员访问管理接口时的提示
pub const ADMIN_ONLY_MESSAGE: &str = "Admin only";

fn request_id_of(request: &Request) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .map_or_else(|| "-".to_string(), ToString::to_string)
}

/// 认证闸门
///
/// 缺少令牌返回 401 `No token`，校验失败返回 401 `Token is not valid`
pub async fn auth_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let request_id = request_id_of(&request);

    let token = AuthUtils::extract_authorization_header(request.headers())
        .and_then(|header| AuthUtils::extract_token(&header));
    let Some(token) = token else {
        ldebug!(
            request_id,
            LogStage::Auth,
            LogComponent::AuthGate,
            "missing_token",
            format!("no bearer credential on {}", request.uri().path())
        );
        return Err(PortalError::unauthenticated(NO_TOKEN_MESSAGE));
    };

    let claims = state.jwt.validate_token(&token)?;
    request.extensions_mut().insert(claims.identity());
    Ok(next.run(request).await)
}

/// 角色闸门：仅管理员可通过
///
/// 必须组合在 [`auth_gate`] 之后
pub async fn require_admin(request: Request, next: Next) -> Result<Response> {
    let Some(identity) = request.extensions().get::<Identity>() else {
        return Err(PortalError::unauthenticated(NO_TOKEN_MESSAGE));
    };
    if !identity.is_admin() {
        lwarn!(
            request_id_of(&request),
            LogStage::Auth,
            LogComponent::RoleGate,
            "admin_required",
            format!(
                "account {} ({}) denied on {}",
                identity.account_id,
                identity.role,
                request.uri().path()
            )
        );
        return Err(PortalError::forbidden(ADMIN_ONLY_MESSAGE));
    }
    Ok(next.run(request).await)
}
