//! # 管理数据处理器
//!
//! 各类记录共用一组泛型增删改查处理器，另含导入、导出、管理员账户与关系对账

use axum::extract::multipart::MultipartError;
use axum::extract::{Extension, Multipart, Path, State};
use axum::http::StatusCode;
use serde_json::Value;

use crate::auth::Identity;
use crate::error::{PortalError, Result};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use crate::management::middleware::RequestId;
use crate::management::response::{ApiResponse, JsonBody, message};
use crate::management::server::AppState;
use crate::management::services::transfer::{ExportSnapshot, export_all, import_students};
use crate::management::services::{AccountService, AccountView, AdminResource, CreateAdminRequest};
use crate::relations::import::ImportSummary;
use crate::relations::sync::{SyncSummary, sync_student_relations};

/// `GET /admin/data/<entity>`
pub async fn list_records<R: AdminResource>(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Value>>> {
    let records = R::default().list(state.db()).await?;
    Ok(ApiResponse::Ok(records))
}

/// `POST /admin/data/<entity>`
pub async fn create_record<R: AdminResource>(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    JsonBody(payload): JsonBody<R::Payload>,
) -> Result<ApiResponse<R::Record>> {
    let record = R::default().create(state.db(), payload).await?;
    linfo!(
        request_id,
        LogStage::Db,
        LogComponent::Admin,
        "create_record",
        format!("{} created", R::LABEL)
    );
    Ok(ApiResponse::Created(record))
}

/// `PUT /admin/data/<entity>/{id}`
pub async fn update_record<R: AdminResource>(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<R::Payload>,
) -> Result<ApiResponse<R::Record>> {
    let record = R::default().update(state.db(), &id, payload).await?;
    linfo!(
        request_id,
        LogStage::Db,
        LogComponent::Admin,
        "update_record",
        format!("{} {id} updated", R::LABEL)
    );
    Ok(ApiResponse::Ok(record))
}

/// `DELETE /admin/data/<entity>/{id}`
pub async fn delete_record<R: AdminResource>(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    R::default().delete(state.db(), &id).await?;
    linfo!(
        request_id,
        LogStage::Db,
        LogComponent::Admin,
        "delete_record",
        format!("{} {id} deleted", R::LABEL)
    );
    Ok(message(format!("{} deleted", R::LABEL)))
}

/// `POST /admin/data/students/import`，表单字段 `file`
pub async fn import_students_file(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Result<ApiResponse<ImportSummary>> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| upload_error(&e))? {
        if field.name() == Some("file") {
            upload = Some(field.bytes().await.map_err(|e| upload_error(&e))?);
            break;
        }
    }
    let Some(data) = upload else {
        return Err(PortalError::validation_field("No file uploaded", "file"));
    };

    let summary = import_students(state.db(), &request_id, &data).await?;
    Ok(ApiResponse::Ok(summary))
}

/// 超过 `max_upload_bytes` 的上传返回 413，其余表单错误为 400
fn upload_error(err: &MultipartError) -> PortalError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PortalError::payload_too_large("Upload too large")
    } else {
        PortalError::validation(format!("Invalid upload: {}", err.body_text()))
    }
}

/// `GET /admin/data/admins`
pub async fn list_admins(State(state): State<AppState>) -> Result<ApiResponse<Vec<AccountView>>> {
    Ok(ApiResponse::Ok(AccountService::new(&state).list_admins().await?))
}

/// `POST /admin/data/admins`
pub async fn create_admin(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateAdminRequest>,
) -> Result<ApiResponse<AccountView>> {
    let admin = AccountService::new(&state).create_admin(request).await?;
    Ok(ApiResponse::Created(admin))
}

/// `DELETE /admin/data/admins/{id}`
pub async fn delete_admin(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>> {
    AccountService::new(&state)
        .delete_admin(&identity.account_id, &id)
        .await?;
    Ok(message("Admin deleted"))
}

/// `GET /admin/data/export/all`
pub async fn export_everything(
    State(state): State<AppState>,
) -> Result<ApiResponse<ExportSnapshot>> {
    Ok(ApiResponse::Ok(export_all(state.db()).await?))
}

/// `POST /admin/data/sync-relations`
pub async fn sync_relations(State(state): State<AppState>) -> Result<ApiResponse<SyncSummary>> {
    Ok(ApiResponse::Ok(sync_student_relations(state.db()).await?))
}
