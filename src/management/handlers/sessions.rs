//! # 辅导预约处理器

use axum::extract::{Extension, Path, State};
use serde_json::Value;

use crate::auth::Identity;
use crate::error::Result;
use crate::management::response::{ApiResponse, JsonBody};
use crate::management::server::AppState;
use crate::management::services::{CreateSessionRequest, SessionService, UpdateSessionRequest};

/// `GET /sessions`
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiResponse<Vec<Value>>> {
    Ok(ApiResponse::Ok(SessionService::new(state.db()).list(&identity).await?))
}

/// `POST /sessions`
pub async fn create_session(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonBody(request): JsonBody<CreateSessionRequest>,
) -> Result<ApiResponse<Value>> {
    let session = SessionService::new(state.db()).create(&identity, request).await?;
    Ok(ApiResponse::Created(session))
}

/// `PUT /sessions/{id}`
pub async fn update_session(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateSessionRequest>,
) -> Result<ApiResponse<Value>> {
    let session = SessionService::new(state.db())
        .update(&identity, &id, request)
        .await?;
    Ok(ApiResponse::Ok(session))
}
