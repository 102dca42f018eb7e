//! # 课程与科目数据服务

use chrono::Utc;
use entity::{courses, departments, subjects};
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

async fn department_map(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = Option<&str>>,
) -> Result<std::collections::HashMap<String, departments::Model>> {
    load_map::<departments::Entity, _>(db, departments::Column::Id, ids_of(ids), |d| {
        d.id.clone()
    })
    .await
}

fn department_summary(dept: &departments::Model) -> Value {
    json!({ "_id": dept.id, "name": dept.name })
}

/// 课程请求体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub code: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub dept_id: Patch<Value>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub credits: Patch<i32>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Patch<String>,
}

impl CoursePayload {
    async fn apply_fields(
        &self,
        db: &DatabaseConnection,
        active: &mut courses::ActiveModel,
    ) -> Result<()> {
        let [dept] = resolve_refs(
            db,
            [RefRequest::json(
                "deptId",
                ReferenceKind::Department,
                self.dept_id.as_ref().map(Option::as_ref),
            )],
        )
        .await?;

        apply(&mut active.credits, self.credits);
        apply(&mut active.description, text_patch(&self.description));
        apply_ref(&mut active.dept_id, dept);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CoursesResource;

#[async_trait::async_trait]
impl AdminResource for CoursesResource {
    type Payload = CoursePayload;
    type Record = courses::Model;

    const LABEL: &'static str = "Course";

    async fn list(&self, db: &DatabaseConnection) -> Result<Vec<Value>> {
        let records = courses::Entity::find()
            .order_by_asc(courses::Column::Code)
            .all(db)
            .await
            .context("Failed to list courses")?;
        let depts = department_map(db, records.iter().map(|c| c.dept_id.as_deref())).await?;

        records
            .iter()
            .map(|course| {
                populate(
                    course,
                    vec![(
                        "deptId",
                        summary(&depts, course.dept_id.as_deref(), department_summary),
                    )],
                )
            })
            .collect()
    }

    async fn create(
        &self,
        db: &DatabaseConnection,
        payload: CoursePayload,
    ) -> Result<courses::Model> {
        let (Some(name), Some(code)) =
            (required_text(&payload.name), required_text(&payload.code))
        else {
            return Err(PortalError::validation("Name and code required"));
        };

        let mut active = courses::ActiveModel {
            id: Set(new_record_id()),
            name: Set(name),
            code: Set(code),
            dept_id: Set(None),
            credits: Set(None),
            description: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        };
        payload.apply_fields(db, &mut active).await?;
        active.insert(db).await.context("Failed to create course")
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: &str,
        payload: CoursePayload,
    ) -> Result<courses::Model> {
        let existing = find_or_404::<courses::Entity>(db, id, Self::LABEL).await?;
        let mut active: courses::ActiveModel = existing.clone().into();
        apply(&mut active.name, required_patch(&payload.name, "name")?);
        apply(&mut active.code, required_patch(&payload.code, "code")?);
        payload.apply_fields(db, &mut active).await?;

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(db).await.context("Failed to update course")
    }

    async fn delete(&self, db: &DatabaseConnection, id: &str) -> Result<()> {
        delete_or_404::<courses::Entity>(db, id, Self::LABEL).await
    }
}

/// 科目请求体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub name: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub code: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub dept_id: Patch<Value>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub course_id: Patch<Value>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub credits: Patch<i32>,
}

impl SubjectPayload {
    async fn apply_fields(
        &self,
        db: &DatabaseConnection,
        active: &mut subjects::ActiveModel,
    ) -> Result<()> {
        let [dept, course] = resolve_refs(
            db,
            [
                RefRequest::json(
                    "deptId",
                    ReferenceKind::Department,
                    self.dept_id.as_ref().map(Option::as_ref),
                ),
                RefRequest::json(
                    "courseId",
                    ReferenceKind::Course,
                    self.course_id.as_ref().map(Option::as_ref),
                ),
            ],
        )
        .await?;

        apply(&mut active.credits, self.credits);
        apply_ref(&mut active.dept_id, dept);
        apply_ref(&mut active.course_id, course);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SubjectsResource;

#[async_trait::async_trait]
impl AdminResource for SubjectsResource {
    type Payload = SubjectPayload;
    type Record = subjects::Model;

    const LABEL: &'static str = "Subject";

    async fn list(&self, db: &DatabaseConnection) -> Result<Vec<Value>> {
        let records = subjects::Entity::find()
            .order_by_asc(subjects::Column::Code)
            .all(db)
            .await
            .context("Failed to list subjects")?;
        let depts = department_map(db, records.iter().map(|s| s.dept_id.as_deref())).await?;
        let course_map = load_map::<courses::Entity, _>(
            db,
            courses::Column::Id,
            ids_of(records.iter().map(|s| s.course_id.as_deref())),
            |c| c.id.clone(),
        )
        .await?;

        records
            .iter()
            .map(|subject| {
                populate(
                    subject,
                    vec![
                        ("deptId", summary(&depts, subject.dept_id.as_deref(), department_summary)),
                        (
                            "courseId",
                            summary(&course_map, subject.course_id.as_deref(), |c| {
                                json!({ "_id": c.id, "name": c.name, "code": c.code })
                            }),
                        ),
                    ],
                )
            })
            .collect()
    }

    async fn create(
        &self,
        db: &DatabaseConnection,
        payload: SubjectPayload,
    ) -> Result<subjects::Model> {
        let (Some(name), Some(code)) =
            (required_text(&payload.name), required_text(&payload.code))
        else {
            return Err(PortalError::validation("Name and code required"));
        };

        let mut active = subjects::ActiveModel {
            id: Set(new_record_id()),
            name: Set(name),
            code: Set(code),
            dept_id: Set(None),
            course_id: Set(None),
            credits: Set(None),
            created_at: Set(Utc::now().naive_utc()),
        };
        payload.apply_fields(db, &mut active).await?;
        active.insert(db).await.context("Failed to create subject")
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: &str,
        payload: SubjectPayload,
    ) -> Result<subjects::Model> {
        let existing = find_or_404::<subjects::Entity>(db, id, Self::LABEL).await?;
        let mut active: subjects::ActiveModel = existing.clone().into();
        apply(&mut active.name, required_patch(&payload.name, "name")?);
        apply(&mut active.code, required_patch(&payload.code, "code")?);
        payload.apply_fields(db, &mut active).await?;

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(db).await.context("Failed to update subject")
    }

    async fn delete(&self, db: &DatabaseConnection, id: &str) -> Result<()> {
        delete_or_404::<subjects::Entity>(db, id, Self::LABEL).await
    }
}
