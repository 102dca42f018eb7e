//! # 学生与家长自助处理器

use axum::extract::{Extension, State};
use serde_json::Value;

use crate::auth::Identity;
use crate::error::Result;
use crate::management::response::ApiResponse;
use crate::management::server::AppState;
use crate::management::services::profiles::{AttendanceReport, ExamReport, FeeReport, StudentDetail};
use crate::management::services::{ParentSelfService, StudentSelfService};

/// `GET /students/me`
pub async fn student_me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiResponse<Value>> {
    let profile = StudentSelfService::new(state.db()).profile(&identity.account_id).await?;
    Ok(ApiResponse::Ok(profile))
}

/// `GET /students/me/attendance`
pub async fn student_attendance(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiResponse<AttendanceReport>> {
    let report = StudentSelfService::new(state.db()).attendance(&identity.account_id).await?;
    Ok(ApiResponse::Ok(report))
}

/// `GET /students/me/exams`
pub async fn student_exams(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiResponse<ExamReport>> {
    let report = StudentSelfService::new(state.db()).exams(&identity.account_id).await?;
    Ok(ApiResponse::Ok(report))
}

/// `GET /students/me/fees`
pub async fn student_fees(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiResponse<FeeReport>> {
    let report = StudentSelfService::new(state.db()).fees(&identity.account_id).await?;
    Ok(ApiResponse::Ok(report))
}

/// `GET /parents/me`
pub async fn parent_me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiResponse<Value>> {
    let profile = ParentSelfService::new(state.db()).profile(&identity.account_id).await?;
    Ok(ApiResponse::Ok(profile))
}

/// `GET /parents/me/student`
pub async fn parent_student(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<ApiResponse<StudentDetail>> {
    let detail = ParentSelfService::new(state.db())
        .linked_student(&identity.account_id)
        .await?;
    Ok(ApiResponse::Ok(detail))
}
