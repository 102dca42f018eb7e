//! # 学生数据服务

use chrono::Utc;
use entity::{departments, faculty, parents, students};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
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

pub const ROLL_EXISTS_MESSAGE: &str = "Roll already exists";

/// 学生请求体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub roll: Patch<String>,
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
    pub parent_id: Patch<Value>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub mentor_id: Patch<Value>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub user_id: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub file_name: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub file_data: Patch<String>,
}

impl StudentPayload {
    fn references(&self) -> [RefRequest; 3] {
        [
            RefRequest::json(
                "deptId",
                ReferenceKind::Department,
                self.dept_id.as_ref().map(Option::as_ref),
            ),
            RefRequest::json(
                "parentId",
                ReferenceKind::Parent,
                self.parent_id.as_ref().map(Option::as_ref),
            ),
            RefRequest::json(
                "mentorId",
                ReferenceKind::Faculty,
                self.mentor_id.as_ref().map(Option::as_ref),
            ),
        ]
    }

    /// 校验并写入除学号、姓名以外的字段
    async fn apply_fields(
        &self,
        db: &DatabaseConnection,
        active: &mut students::ActiveModel,
    ) -> Result<()> {
        let dob = date_patch(&self.dob, "dob")?;
        let gender = choice_patch(&self.gender, "gender", GENDERS)?;
        let [dept, parent, mentor] = resolve_refs(db, self.references()).await?;

        apply(&mut active.email, lower_patch(&self.email));
        apply(&mut active.phone, text_patch(&self.phone));
        apply(&mut active.dob, dob);
        apply(&mut active.gender, gender);
        apply(&mut active.address, text_patch(&self.address));
        apply(&mut active.user_id, text_patch(&self.user_id));
        apply(&mut active.file_name, text_patch(&self.file_name));
        apply(&mut active.file_data, text_patch(&self.file_data));
        apply_ref(&mut active.dept_id, dept);
        apply_ref(&mut active.parent_id, parent);
        apply_ref(&mut active.mentor_id, mentor);
        Ok(())
    }
}

async fn roll_taken(db: &DatabaseConnection, roll: &str, except: Option<&str>) -> Result<bool> {
    let mut query = students::Entity::find().filter(students::Column::Roll.eq(roll));
    if let Some(id) = except {
        query = query.filter(students::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

/// 学生记录联表：院系、家长、导师摘要
pub async fn populate_students(
    db: &DatabaseConnection,
    records: &[students::Model],
) -> Result<Vec<Value>> {
    let depts = load_map::<departments::Entity, _>(
        db,
        departments::Column::Id,
        ids_of(records.iter().map(|s| s.dept_id.as_deref())),
        |d| d.id.clone(),
    )
    .await?;
    let parent_map = load_map::<parents::Entity, _>(
        db,
        parents::Column::Id,
        ids_of(records.iter().map(|s| s.parent_id.as_deref())),
        |p| p.id.clone(),
    )
    .await?;
    let mentors = load_map::<faculty::Entity, _>(
        db,
        faculty::Column::Id,
        ids_of(records.iter().map(|s| s.mentor_id.as_deref())),
        |f| f.id.clone(),
    )
    .await?;

    records
        .iter()
        .map(|student| {
            populate(
                student,
                vec![
                    (
                        "deptId",
                        summary(&depts, student.dept_id.as_deref(), |d| {
                            json!({ "_id": d.id, "name": d.name })
                        }),
                    ),
                    (
                        "parentId",
                        summary(&parent_map, student.parent_id.as_deref(), |p| {
                            json!({ "_id": p.id, "name": p.name, "pid": p.pid, "phone": p.phone })
                        }),
                    ),
                    (
                        "mentorId",
                        summary(&mentors, student.mentor_id.as_deref(), |f| {
                            json!({
                                "_id": f.id,
                                "name": f.name,
                                "fid": f.fid,
                                "email": f.email,
                                "phone": f.phone,
                            })
                        }),
                    ),
                ],
            )
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct StudentsResource;

#[async_trait::async_trait]
impl AdminResource for StudentsResource {
    type Payload = StudentPayload;
    type Record = students::Model;

    const LABEL: &'static str = "Student";

    async fn list(&self, db: &DatabaseConnection) -> Result<Vec<Value>> {
        let records = students::Entity::find()
            .order_by_asc(students::Column::CreatedAt)
            .all(db)
            .await
            .context("Failed to list students")?;
        populate_students(db, &records).await
    }

    async fn create(
        &self,
        db: &DatabaseConnection,
        payload: StudentPayload,
    ) -> Result<students::Model> {
        let (Some(name), Some(roll)) =
            (required_text(&payload.name), required_text(&payload.roll))
        else {
            return Err(PortalError::validation("Name and roll required"));
        };
        if roll_taken(db, &roll, None).await? {
            return Err(PortalError::validation_field(ROLL_EXISTS_MESSAGE, "roll"));
        }

        let mut active = students::ActiveModel {
            id: Set(new_record_id()),
            name: Set(name),
            roll: Set(roll),
            email: Set(None),
            phone: Set(None),
            dob: Set(None),
            gender: Set(None),
            address: Set(None),
            dept_id: Set(None),
            parent_id: Set(None),
            mentor_id: Set(None),
            user_id: Set(None),
            file_name: Set(None),
            file_data: Set(None),
            extra_json: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        };
        payload.apply_fields(db, &mut active).await?;
        active.insert(db).await.context("Failed to create student")
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: &str,
        payload: StudentPayload,
    ) -> Result<students::Model> {
        let existing = find_or_404::<students::Entity>(db, id, Self::LABEL).await?;
        let name = required_patch(&payload.name, "name")?;
        let roll = required_patch(&payload.roll, "roll")?;
        if let Some(roll) = roll.as_deref() {
            if roll != existing.roll && roll_taken(db, roll, Some(id)).await? {
                return Err(PortalError::validation_field(ROLL_EXISTS_MESSAGE, "roll"));
            }
        }

        let mut active: students::ActiveModel = existing.clone().into();
        apply(&mut active.name, name);
        apply(&mut active.roll, roll);
        payload.apply_fields(db, &mut active).await?;

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(db).await.context("Failed to update student")
    }

    async fn delete(&self, db: &DatabaseConnection, id: &str) -> Result<()> {
        delete_or_404::<students::Entity>(db, id, Self::LABEL).await
    }
}
