//! # 院系数据服务

use chrono::Utc;
use entity::{departments, faculty};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use serde_json::{Value, json};

use super::resource::{AdminResource, resolve_refs};
use super::shared::{
    Patch, apply, apply_ref, delete_or_404, find_or_404, ids_of, load_map, populate,
    required_patch, required_text, summary, text_patch,
};
use crate::error::{Context, PortalError, Result};
use crate::relations::{RefRequest, ReferenceKind};
use crate::types::new_record_id;

/// 院系请求体，`id` 为历史文本编号
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub code: Patch<String>,
    #[serde(default, rename = "id", with = "::serde_with::rust::double_option")]
    pub legacy_id: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub hod: Patch<Value>,
}

impl DepartmentPayload {
    async fn apply_fields(
        &self,
        db: &DatabaseConnection,
        active: &mut departments::ActiveModel,
    ) -> Result<()> {
        let [hod] = resolve_refs(
            db,
            [RefRequest::json(
                "hod",
                ReferenceKind::Faculty,
                self.hod.as_ref().map(Option::as_ref),
            )],
        )
        .await?;

        apply(&mut active.legacy_id, text_patch(&self.legacy_id));
        apply(&mut active.description, text_patch(&self.description));
        apply_ref(&mut active.hod, hod);
        Ok(())
    }
}

/// 院系记录联表：系主任摘要
pub async fn populate_departments(
    db: &DatabaseConnection,
    records: &[departments::Model],
) -> Result<Vec<Value>> {
    let heads = load_map::<faculty::Entity, _>(
        db,
        faculty::Column::Id,
        ids_of(records.iter().map(|d| d.hod.as_deref())),
        |f| f.id.clone(),
    )
    .await?;

    records
        .iter()
        .map(|dept| {
            populate(
                dept,
                vec![(
                    "hod",
                    summary(&heads, dept.hod.as_deref(), |f| {
                        json!({ "_id": f.id, "name": f.name, "fid": f.fid })
                    }),
                )],
            )
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct DepartmentsResource;

#[async_trait::async_trait]
impl AdminResource for DepartmentsResource {
    type Payload = DepartmentPayload;
    type Record = departments::Model;

    const LABEL: &'static str = "Department";

    async fn list(&self, db: &DatabaseConnection) -> Result<Vec<Value>> {
        let records = departments::Entity::find()
            .order_by_asc(departments::Column::Name)
            .all(db)
            .await
            .context("Failed to list departments")?;
        populate_departments(db, &records).await
    }

    async fn create(
        &self,
        db: &DatabaseConnection,
        payload: DepartmentPayload,
    ) -> Result<departments::Model> {
        let (Some(name), Some(code)) =
            (required_text(&payload.name), required_text(&payload.code))
        else {
            return Err(PortalError::validation("Name and code required"));
        };

        let mut active = departments::ActiveModel {
            id: Set(new_record_id()),
            name: Set(name),
            code: Set(code),
            legacy_id: Set(None),
            description: Set(None),
            hod: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        };
        payload.apply_fields(db, &mut active).await?;
        active.insert(db).await.context("Failed to create department")
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: &str,
        payload: DepartmentPayload,
    ) -> Result<departments::Model> {
        let existing = find_or_404::<departments::Entity>(db, id, Self::LABEL).await?;
        let mut active: departments::ActiveModel = existing.clone().into();
        apply(&mut active.name, required_patch(&payload.name, "name")?);
        apply(&mut active.code, required_patch(&payload.code, "code")?);
        payload.apply_fields(db, &mut active).await?;

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(db).await.context("Failed to update department")
    }

    async fn delete(&self, db: &DatabaseConnection, id: &str) -> Result<()> {
        delete_or_404::<departments::Entity>(db, id, Self::LABEL).await
    }
}
