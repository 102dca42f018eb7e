//! # 辅导预约服务
//!
//! 调用者只能看到、修改自己作为学生或辅导员一方的预约

use chrono::Utc;
use entity::{accounts, counseling_sessions};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::shared::{
    Patch, apply, clean_text, find_or_404, ids_of, load_map, populate, summary, text_patch,
};
use crate::auth::Identity;
use crate::error::{Context, PortalError, Result};
use crate::linfo;
use crate::logging::{LogComponent, LogStage};
use crate::types::{SESSION_STATUSES, check_choice, new_record_id, parse_datetime};

pub const SCHEDULED: &str = "scheduled";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub counselor_id: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSessionRequest {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub status: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub notes: Patch<String>,
}

/// 预约联表：双方的 `{_id, name, email}`
async fn populate_sessions(
    db: &DatabaseConnection,
    records: &[counseling_sessions::Model],
) -> Result<Vec<Value>> {
    let parties = load_map::<accounts::Entity, _>(
        db,
        accounts::Column::Id,
        ids_of(
            records
                .iter()
                .flat_map(|s| [Some(s.student.as_str()), Some(s.counselor.as_str())]),
        ),
        |a| a.id.clone(),
    )
    .await?;
    let render = |a: &accounts::Model| json!({ "_id": a.id, "name": a.name, "email": a.email });

    records
        .iter()
        .map(|session| {
            populate(
                session,
                vec![
                    ("student", summary(&parties, Some(session.student.as_str()), render)),
                    ("counselor", summary(&parties, Some(session.counselor.as_str()), render)),
                ],
            )
        })
        .collect()
}

async fn populate_one(
    db: &DatabaseConnection,
    session: counseling_sessions::Model,
) -> Result<Value> {
    populate_sessions(db, &[session])
        .await?
        .pop()
        .ok_or_else(|| PortalError::internal("populate returned no record"))
}

/// 预约服务
pub struct SessionService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SessionService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 调用者参与的预约，按日期倒序
    pub async fn list(&self, identity: &Identity) -> Result<Vec<Value>> {
        let me = identity.account_id.as_str();
        let records = counseling_sessions::Entity::find()
            .filter(
                Condition::any()
                    .add(counseling_sessions::Column::Student.eq(me))
                    .add(counseling_sessions::Column::Counselor.eq(me)),
            )
            .order_by_desc(counseling_sessions::Column::Date)
            .all(self.db)
            .await
            .context("Failed to list sessions")?;
        populate_sessions(self.db, &records).await
    }

    /// 调用者作为学生一方发起预约
    pub async fn create(
        &self,
        identity: &Identity,
        request: CreateSessionRequest,
    ) -> Result<Value> {
        let counselor_id = request
            .counselor_id
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        let raw_date = request.date.as_deref().map(str::trim).unwrap_or_default();
        if counselor_id.is_empty() || raw_date.is_empty() {
            return Err(PortalError::validation("counselorId and date required"));
        }
        let date = parse_datetime(raw_date).ok_or_else(|| {
            PortalError::validation_field(format!("Invalid date: {raw_date}"), "date")
        })?;
        let counselor = accounts::Entity::find_by_id(counselor_id.to_string())
            .one(self.db)
            .await?;
        if counselor.is_none() {
            return Err(PortalError::validation_field("Counselor not found", "counselorId"));
        }

        let session = counseling_sessions::ActiveModel {
            id: Set(new_record_id()),
            student: Set(identity.account_id.clone()),
            counselor: Set(counselor_id.to_string()),
            date: Set(date),
            status: Set(SCHEDULED.to_string()),
            notes: Set(request.notes.as_deref().and_then(clean_text)),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(self.db)
        .await
        .context("Failed to create session")?;

        linfo!(
            identity.account_id,
            LogStage::Db,
            LogComponent::Session,
            "create_session",
            format!("session {} with counselor {counselor_id} on {date}", session.id)
        );
        populate_one(self.db, session).await
    }

    /// 更新状态或备注，仅限双方
    pub async fn update(
        &self,
        identity: &Identity,
        id: &str,
        request: UpdateSessionRequest,
    ) -> Result<Value> {
        let session = find_or_404::<counseling_sessions::Entity>(self.db, id, "Session").await?;
        let me = identity.account_id.as_str();
        if session.student != me && session.counselor != me {
            return Err(PortalError::forbidden("Not a party to this session"));
        }

        let status = text_patch(&request.status).flatten();
        if let Some(status) = status.as_deref() {
            check_choice("status", status, SESSION_STATUSES)?;
        }

        let mut active: counseling_sessions::ActiveModel = session.clone().into();
        apply(&mut active.status, status);
        apply(&mut active.notes, text_patch(&request.notes));
        if !active.is_changed() {
            return populate_one(self.db, session).await;
        }
        let session = active.update(self.db).await.context("Failed to update session")?;
        populate_one(self.db, session).await
    }
}
