//! # 教师数据服务

use chrono::Utc;
use entity::{departments, faculty};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use serde_json::{Value, json};

use super::resource::{AdminResource, resolve_refs};
use super::shared::{
    Patch, apply, apply_ref, choice_patch, date_patch, delete_or_404, find_or_404, ids_of,
    load_map, lower_patch, populate, required_patch, required_text, summary, text_patch,
};
use crate::error::{Context, PortalError, Result};
use crate::relations::{RefRequest, ReferenceKind};
use crate::types::{GENDERS, new_record_id};

/// 教师请求体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyPayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub fid: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub email: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub phone: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub dob: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub gender: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub address: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub dept_id: Patch<Value>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub salary: Patch<f64>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub user_id: Patch<String>,
}

impl FacultyPayload {
    async fn apply_fields(
        &self,
        db: &DatabaseConnection,
        active: &mut faculty::ActiveModel,
    ) -> Result<()> {
        let dob = date_patch(&self.dob, "dob")?;
        let gender = choice_patch(&self.gender, "gender", GENDERS)?;
        let [dept] = resolve_refs(
            db,
            [RefRequest::json(
                "deptId",
                ReferenceKind::Department,
                self.dept_id.as_ref().map(Option::as_ref),
            )],
        )
        .await?;

        apply(&mut active.email, lower_patch(&self.email));
        apply(&mut active.phone, text_patch(&self.phone));
        apply(&mut active.dob, dob);
        apply(&mut active.gender, gender);
        apply(&mut active.address, text_patch(&self.address));
        apply(&mut active.salary, self.salary);
        apply(&mut active.user_id, text_patch(&self.user_id));
        apply_ref(&mut active.dept_id, dept);
        Ok(())
    }
}

/// 教师记录联表：院系摘要
pub async fn populate_faculty(
    db: &DatabaseConnection,
    records: &[faculty::Model],
) -> Result<Vec<Value>> {
    let depts = load_map::<departments::Entity, _>(
        db,
        departments::Column::Id,
        ids_of(records.iter().map(|f| f.dept_id.as_deref())),
        |d| d.id.clone(),
    )
    .await?;

    records
        .iter()
        .map(|member| {
            populate(
                member,
                vec![(
                    "deptId",
                    summary(&depts, member.dept_id.as_deref(), |d| {
                        json!({ "_id": d.id, "name": d.name })
                    }),
                )],
            )
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct FacultyResource;

#[async_trait::async_trait]
impl AdminResource for FacultyResource {
    type Payload = FacultyPayload;
    type Record = faculty::Model;

    const LABEL: &'static str = "Faculty";

    async fn list(&self, db: &DatabaseConnection) -> Result<Vec<Value>> {
        let records = faculty::Entity::find()
            .order_by_asc(faculty::Column::CreatedAt)
            .all(db)
            .await
            .context("Failed to list faculty")?;
        populate_faculty(db, &records).await
    }

    async fn create(
        &self,
        db: &DatabaseConnection,
        payload: FacultyPayload,
    ) -> Result<faculty::Model> {
        let (Some(name), Some(fid)) =
            (required_text(&payload.name), required_text(&payload.fid))
        else {
            return Err(PortalError::validation("Name and fid required"));
        };

        let mut active = faculty::ActiveModel {
            id: Set(new_record_id()),
            name: Set(name),
            fid: Set(fid),
            email: Set(None),
            phone: Set(None),
            dob: Set(None),
            gender: Set(None),
            address: Set(None),
            dept_id: Set(None),
            salary: Set(None),
            user_id: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        };
        payload.apply_fields(db, &mut active).await?;
        active.insert(db).await.context("Failed to create faculty")
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: &str,
        payload: FacultyPayload,
    ) -> Result<faculty::Model> {
        let existing = find_or_404::<faculty::Entity>(db, id, Self::LABEL).await?;
        let mut active: faculty::ActiveModel = existing.clone().into();
        apply(&mut active.name, required_patch(&payload.name, "name")?);
        apply(&mut active.fid, required_patch(&payload.fid, "fid")?);
        payload.apply_fields(db, &mut active).await?;

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(db).await.context("Failed to update faculty")
    }

    async fn delete(&self, db: &DatabaseConnection, id: &str) -> Result<()> {
        delete_or_404::<faculty::Entity>(db, id, Self::LABEL).await
    }
}
