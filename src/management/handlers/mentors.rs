//! # 导师视图处理器

use axum::extract::{Extension, Path, State};
use serde_json::Value;

use crate::auth::Identity;
use crate::error::Result;
use crate::management::response::ApiResponse;
use crate::management::server::AppState;
use crate::management::services::MentorService;
use crate::management::services::mentors::{MentorStats, MentorStudents};
use crate::management::services::profiles::StudentDetail;

/// `GET /mentors/me`
pub async fn mentor_me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiResponse<Value>> {
    Ok(ApiResponse::Ok(MentorService::new(state.db()).profile(&identity.account_id).await?))
}

/// `GET /mentors/me/students`
pub async fn mentor_students(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiResponse<MentorStudents>> {
    Ok(ApiResponse::Ok(MentorService::new(state.db()).students(&identity.account_id).await?))
}

/// `GET /mentors/me/students/{roll}`
pub async fn mentor_student(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(roll): Path<String>,
) -> Result<ApiResponse<StudentDetail>> {
    let detail = MentorService::new(state.db())
        .student(&identity.account_id, &roll)
        .await?;
    Ok(ApiResponse::Ok(detail))
}

/// `GET /mentors/me/stats`
pub async fn mentor_stats(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiResponse<MentorStats>> {
    Ok(ApiResponse::Ok(MentorService::new(state.db()).stats(&identity.account_id).await?))
}
