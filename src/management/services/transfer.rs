//! # 数据导入与导出

use std::collections::HashSet;

use chrono::Utc;
use entity::{
    accounts, attendance, counseling_sessions, courses, departments, exams, faculty, fees, parents,
    students, subjects,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
    SqlErr,
};
use serde::Serialize;

use super::auth::AccountView;
use crate::auth::UserRole;
use crate::error::{Context, Result};
use crate::logging::{LogComponent, LogStage};
use crate::relations::import::{ImportSummary, parse_csv, plan_import};
use crate::types::new_record_id;
use crate::{linfo, lwarn};

/// 全量数据快照
#[derive(Debug, Serialize)]
pub struct ExportSnapshot {
    pub students: Vec<students::Model>,
    pub faculty: Vec<faculty::Model>,
    pub parents: Vec<parents::Model>,
    pub departments: Vec<departments::Model>,
    pub attendance: Vec<attendance::Model>,
    pub exams: Vec<exams::Model>,
    pub fees: Vec<fees::Model>,
    pub courses: Vec<courses::Model>,
    pub subjects: Vec<subjects::Model>,
    pub admins: Vec<AccountView>,
    pub sessions: Vec<counseling_sessions::Model>,
}

/// 导出全部集合
pub async fn export_all(db: &DatabaseConnection) -> Result<ExportSnapshot> {
    let admins = accounts::Entity::find()
        .filter(accounts::Column::Role.eq(UserRole::Admin.as_str()))
        .all(db)
        .await?
        .into_iter()
        .map(AccountView::from)
        .collect();

    Ok(ExportSnapshot {
        students: students::Entity::find()
            .all(db)
            .await
            .context("Failed to export students")?,
        faculty: faculty::Entity::find()
            .all(db)
            .await
            .context("Failed to export faculty")?,
        parents: parents::Entity::find()
            .all(db)
            .await
            .context("Failed to export parents")?,
        departments: departments::Entity::find()
            .all(db)
            .await
            .context("Failed to export departments")?,
        attendance: attendance::Entity::find()
            .all(db)
            .await
            .context("Failed to export attendance")?,
        exams: exams::Entity::find()
            .all(db)
            .await
            .context("Failed to export exams")?,
        fees: fees::Entity::find()
            .all(db)
            .await
            .context("Failed to export fees")?,
        courses: courses::Entity::find()
            .all(db)
            .await
            .context("Failed to export courses")?,
        subjects: subjects::Entity::find()
            .all(db)
            .await
            .context("Failed to export subjects")?,
        admins,
        sessions: counseling_sessions::Entity::find()
            .all(db)
            .await
            .context("Failed to export sessions")?,
    })
}

/// 从逗号分隔文本批量创建学生
///
/// 学号已存在的行跳过，不做更新
pub async fn import_students(
    db: &DatabaseConnection,
    request_id: &str,
    data: &[u8],
) -> Result<ImportSummary> {
    let rows = parse_csv(data)?;
    let existing: HashSet<String> = students::Entity::find()
        .select_only()
        .column(students::Column::Roll)
        .into_tuple::<String>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    let (drafts, mut skipped) = plan_import(&rows, &existing);
    let mut imported = 0;
    for draft in drafts {
        let extra_json = draft.extra_json();
        let inserted = students::ActiveModel {
            id: Set(new_record_id()),
            name: Set(draft.name),
            roll: Set(draft.roll.clone()),
            email: Set(draft.email),
            phone: Set(draft.phone),
            dob: Set(None),
            gender: Set(draft.gender),
            address: Set(draft.address),
            dept_id: Set(None),
            parent_id: Set(None),
            mentor_id: Set(None),
            user_id: Set(None),
            file_name: Set(None),
            file_data: Set(None),
            extra_json: Set(extra_json),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(db)
        .await;

        match inserted {
            Ok(_) => imported += 1,
            // 与并发写入撞上学号时按跳过处理
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                lwarn!(
                    request_id,
                    LogStage::Db,
                    LogComponent::Import,
                    "import_row_failed",
                    format!("roll {}: {err}", draft.roll)
                );
                skipped += 1;
            }
            Err(err) => return Err(err).context("Failed to import student"),
        }
    }

    linfo!(
        request_id,
        LogStage::Db,
        LogComponent::Import,
        "import_students",
        format!("{} rows: imported {imported}, skipped {skipped}", rows.len())
    );
    Ok(ImportSummary { imported, skipped })
}
