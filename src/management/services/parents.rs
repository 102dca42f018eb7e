//! # 家长数据服务
//!
//! 家长编号同时存放在 `pid` 与 `parentId` 两个字段

use chrono::Utc;
use entity::{parents, students};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use serde_json::{Value, json};

use super::resource::{AdminResource, resolve_refs};
use super::shared::{
    Patch, apply, apply_ref, delete_or_404, find_or_404, ids_of, load_map, lower_patch, populate,
    required_patch, required_text, summary, text_patch,
};
use crate::error::{Context, PortalError, Result};
use crate::relations::{RefRequest, ReferenceKind};
use crate::types::new_record_id;

/// 家长请求体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentPayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub pid: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub parent_id: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub email: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub phone: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub address: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub linked_student: Patch<Value>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub user_id: Patch<String>,
}

impl ParentPayload {
    async fn apply_fields(
        &self,
        db: &DatabaseConnection,
        active: &mut parents::ActiveModel,
    ) -> Result<()> {
        let [linked] = resolve_refs(
            db,
            [RefRequest::json(
                "linkedStudent",
                ReferenceKind::Student,
                self.linked_student.as_ref().map(Option::as_ref),
            )],
        )
        .await?;

        apply(&mut active.email, lower_patch(&self.email));
        apply(&mut active.phone, text_patch(&self.phone));
        apply(&mut active.address, text_patch(&self.address));
        apply(&mut active.user_id, text_patch(&self.user_id));
        apply_ref(&mut active.linked_student, linked);
        Ok(())
    }
}

/// 家长记录联表：关联学生摘要
pub async fn populate_parents(
    db: &DatabaseConnection,
    records: &[parents::Model],
) -> Result<Vec<Value>> {
    let linked = load_map::<students::Entity, _>(
        db,
        students::Column::Id,
        ids_of(records.iter().map(|p| p.linked_student.as_deref())),
        |s| s.id.clone(),
    )
    .await?;

    records
        .iter()
        .map(|parent| {
            populate(
                parent,
                vec![(
                    "linkedStudent",
                    summary(&linked, parent.linked_student.as_deref(), |s| {
                        json!({ "_id": s.id, "name": s.name, "roll": s.roll })
                    }),
                )],
            )
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct ParentsResource;

#[async_trait::async_trait]
impl AdminResource for ParentsResource {
    type Payload = ParentPayload;
    type Record = parents::Model;

    const LABEL: &'static str = "Parent";

    async fn list(&self, db: &DatabaseConnection) -> Result<Vec<Value>> {
        let records = parents::Entity::find()
            .order_by_asc(parents::Column::CreatedAt)
            .all(db)
            .await
            .context("Failed to list parents")?;
        populate_parents(db, &records).await
    }

    async fn create(
        &self,
        db: &DatabaseConnection,
        payload: ParentPayload,
    ) -> Result<parents::Model> {
        let (Some(name), Some(pid)) =
            (required_text(&payload.name), required_text(&payload.pid))
        else {
            return Err(PortalError::validation("Name and pid required"));
        };
        let parent_id = required_text(&payload.parent_id).unwrap_or_else(|| pid.clone());

        let mut active = parents::ActiveModel {
            id: Set(new_record_id()),
            name: Set(name),
            pid: Set(pid),
            parent_id: Set(Some(parent_id)),
            email: Set(None),
            phone: Set(None),
            address: Set(None),
            linked_student: Set(None),
            user_id: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        };
        payload.apply_fields(db, &mut active).await?;
        active.insert(db).await.context("Failed to create parent")
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: &str,
        payload: ParentPayload,
    ) -> Result<parents::Model> {
        let existing = find_or_404::<parents::Entity>(db, id, Self::LABEL).await?;
        let pid = required_patch(&payload.pid, "pid")?;

        let mut active: parents::ActiveModel = existing.clone().into();
        apply(&mut active.name, required_patch(&payload.name, "name")?);
        // 只改 pid 时两个编号字段保持一致
        match text_patch(&payload.parent_id) {
            Some(parent_id) => apply(&mut active.parent_id, Some(parent_id)),
            None => apply(&mut active.parent_id, pid.clone().map(Some)),
        }
        apply(&mut active.pid, pid);
        payload.apply_fields(db, &mut active).await?;

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(db).await.context("Failed to update parent")
    }

    async fn delete(&self, db: &DatabaseConnection, id: &str) -> Result<()> {
        delete_or_404::<parents::Entity>(db, id, Self::LABEL).await
    }
}
