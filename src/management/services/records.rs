//! # 出勤、考试、学费记录服务
//!
//! 三类记录都以学号文本关联学生，不做引用解析

use chrono::Utc;
use entity::{attendance, exams, fees};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use serde_json::Value;

use super::resource::AdminResource;
use super::shared::{Patch, apply, delete_or_404, find_or_404, required_patch, required_text};
use crate::error::{Context, PortalError, Result};
use crate::types::{ATTENDANCE_STATUSES, check_choice, new_record_id, parse_date};

fn to_values<T: serde::Serialize>(records: &[T]) -> Result<Vec<Value>> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(PortalError::from))
        .collect()
}

/// 必填日期与状态的校验
fn parse_attendance_date(raw: &str) -> Result<chrono::NaiveDate> {
    parse_date(raw)
        .ok_or_else(|| PortalError::validation_field(format!("Invalid date: {raw}"), "date"))
}

/// 出勤请求体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub student_roll: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub date: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub status: Patch<String>,
}

#[derive(Debug, Default)]
pub struct AttendanceResource;

#[async_trait::async_trait]
impl AdminResource for AttendanceResource {
    type Payload = AttendancePayload;
    type Record = attendance::Model;

    const LABEL: &'static str = "Attendance record";

    async fn list(&self, db: &DatabaseConnection) -> Result<Vec<Value>> {
        let records = attendance::Entity::find()
            .order_by_desc(attendance::Column::Date)
            .all(db)
            .await
            .context("Failed to list attendance")?;
        to_values(&records)
    }

    async fn create(
        &self,
        db: &DatabaseConnection,
        payload: AttendancePayload,
    ) -> Result<attendance::Model> {
        let (Some(roll), Some(date), Some(status)) = (
            required_text(&payload.student_roll),
            required_text(&payload.date),
            required_text(&payload.status),
        ) else {
            return Err(PortalError::validation("studentRoll, date and status required"));
        };
        check_choice("status", &status, ATTENDANCE_STATUSES)?;

        attendance::ActiveModel {
            id: Set(new_record_id()),
            student_roll: Set(roll),
            date: Set(parse_attendance_date(&date)?),
            status: Set(status),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(db)
        .await
        .context("Failed to create attendance record")
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: &str,
        payload: AttendancePayload,
    ) -> Result<attendance::Model> {
        let existing = find_or_404::<attendance::Entity>(db, id, Self::LABEL).await?;
        let date = required_patch(&payload.date, "date")?
            .map(|raw| parse_attendance_date(&raw))
            .transpose()?;
        let status = required_patch(&payload.status, "status")?;
        if let Some(status) = status.as_deref() {
            check_choice("status", status, ATTENDANCE_STATUSES)?;
        }

        let mut active: attendance::ActiveModel = existing.clone().into();
        apply(&mut active.student_roll, required_patch(&payload.student_roll, "studentRoll")?);
        apply(&mut active.date, date);
        apply(&mut active.status, status);

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(db).await.context("Failed to update attendance record")
    }

    async fn delete(&self, db: &DatabaseConnection, id: &str) -> Result<()> {
        delete_or_404::<attendance::Entity>(db, id, Self::LABEL).await
    }
}

/// 考试请求体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub roll: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub subject: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub exam_name: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub marks: Patch<f64>,
}

#[derive(Debug, Default)]
pub struct ExamsResource;

#[async_trait::async_trait]
impl AdminResource for ExamsResource {
    type Payload = ExamPayload;
    type Record = exams::Model;

    const LABEL: &'static str = "Exam record";

    async fn list(&self, db: &DatabaseConnection) -> Result<Vec<Value>> {
        let records = exams::Entity::find()
            .order_by_asc(exams::Column::CreatedAt)
            .all(db)
            .await
            .context("Failed to list exams")?;
        to_values(&records)
    }

    async fn create(&self, db: &DatabaseConnection, payload: ExamPayload) -> Result<exams::Model> {
        let (Some(roll), Some(subject), Some(exam_name), Some(Some(marks))) = (
            required_text(&payload.roll),
            required_text(&payload.subject),
            required_text(&payload.exam_name),
            payload.marks,
        ) else {
            return Err(PortalError::validation("roll, subject, examName and marks required"));
        };

        exams::ActiveModel {
            id: Set(new_record_id()),
            roll: Set(roll),
            subject: Set(subject),
            exam_name: Set(exam_name),
            marks: Set(marks),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(db)
        .await
        .context("Failed to create exam record")
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: &str,
        payload: ExamPayload,
    ) -> Result<exams::Model> {
        let existing = find_or_404::<exams::Entity>(db, id, Self::LABEL).await?;
        let marks = match payload.marks {
            Some(None) => {
                return Err(PortalError::validation_field("marks cannot be empty", "marks"));
            }
            other => other.flatten(),
        };

        let mut active: exams::ActiveModel = existing.clone().into();
        apply(&mut active.roll, required_patch(&payload.roll, "roll")?);
        apply(&mut active.subject, required_patch(&payload.subject, "subject")?);
        apply(&mut active.exam_name, required_patch(&payload.exam_name, "examName")?);
        apply(&mut active.marks, marks);

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(db).await.context("Failed to update exam record")
    }

    async fn delete(&self, db: &DatabaseConnection, id: &str) -> Result<()> {
        delete_or_404::<exams::Entity>(db, id, Self::LABEL).await
    }
}

/// 学费请求体，金额缺失时按 0 计
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeePayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub roll: Patch<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub total: Patch<f64>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub paid: Patch<f64>,
}

#[derive(Debug, Default)]
pub struct FeesResource;

#[async_trait::async_trait]
impl AdminResource for FeesResource {
    type Payload = FeePayload;
    type Record = fees::Model;

    const LABEL: &'static str = "Fee record";

    async fn list(&self, db: &DatabaseConnection) -> Result<Vec<Value>> {
        let records = fees::Entity::find()
            .order_by_asc(fees::Column::CreatedAt)
            .all(db)
            .await
            .context("Failed to list fees")?;
        to_values(&records)
    }

    async fn create(&self, db: &DatabaseConnection, payload: FeePayload) -> Result<fees::Model> {
        let Some(roll) = required_text(&payload.roll) else {
            return Err(PortalError::validation_field("roll required", "roll"));
        };

        fees::ActiveModel {
            id: Set(new_record_id()),
            roll: Set(roll),
            total: Set(payload.total.flatten().unwrap_or(0.0)),
            paid: Set(payload.paid.flatten().unwrap_or(0.0)),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(db)
        .await
        .context("Failed to create fee record")
    }

    async fn update(
        &self,
        db: &DatabaseConnection,
        id: &str,
        payload: FeePayload,
    ) -> Result<fees::Model> {
        let existing = find_or_404::<fees::Entity>(db, id, Self::LABEL).await?;
        let mut active: fees::ActiveModel = existing.clone().into();
        apply(&mut active.roll, required_patch(&payload.roll, "roll")?);
        apply(&mut active.total, payload.total.map(|v| v.unwrap_or(0.0)));
        apply(&mut active.paid, payload.paid.map(|v| v.unwrap_or(0.0)));

        if !active.is_changed() {
            return Ok(existing);
        }
        active.update(db).await.context("Failed to update fee record")
    }

    async fn delete(&self, db: &DatabaseConnection, id: &str) -> Result<()> {
        delete_or_404::<fees::Entity>(db, id, Self::LABEL).await
    }
}
