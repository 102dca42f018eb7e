//! # 批量关系对账
//!
//! 以学生数据为准补齐院系、家长、导师的链接，缺失的目标记录自动创建；
//! 以及从导入时保留的原始列中补齐学生的邮箱和电话。

use entity::{faculty, parents, students};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;

use crate::error::Result;
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

use super::import::{
    DEPARTMENT_KEYS, EMAIL_KEYS, MENTOR_NAME_KEYS, PARENT_ADDRESS_KEYS, PARENT_EMAIL_KEYS,
    PARENT_NAME_KEYS, PARENT_PHONE_KEYS, PHONE_KEYS, pick_extra,
};
use super::reference::{RefInput, ReferenceKind, Resolution};
use super::resolver::{CreateIfMissingResolve, ResolveStrategy};
use super::store::SeaOrmReferenceStore;

/// 对账统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub students_scanned: u64,
    pub departments_created: u64,
    pub parents_created: u64,
    pub mentors_created: u64,
    pub students_updated: u64,
    pub parents_updated: u64,
    pub mentors_updated: u64,
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// 解析一个来自原始列的名称，失败时记录警告并忽略
async fn resolve_name<R: ResolveStrategy + ?Sized>(
    resolver: &R,
    kind: ReferenceKind,
    roll: &str,
    raw: Option<String>,
) -> Result<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match resolver.resolve(kind, &RefInput::from_text(Some(&raw))).await? {
        Resolution::Resolved(id) => Ok(Some(id)),
        Resolution::Error(message) => {
            lwarn!(
                "system",
                LogStage::Maintenance,
                LogComponent::Sync,
                "resolve_failed",
                format!("student {roll}: {message}")
            );
            Ok(None)
        }
        Resolution::NotProvided | Resolution::ExplicitNull => Ok(None),
    }
}

/// 用学生行数据补齐家长的空字段
async fn fill_parent(
    db: &DatabaseConnection,
    parent_id: &str,
    student: &students::Model,
) -> Result<bool> {
    let Some(parent) = parents::Entity::find_by_id(parent_id.to_string()).one(db).await? else {
        return Ok(false);
    };
    let extra = student.extra_json.as_deref();
    let mut active: parents::ActiveModel = parent.clone().into();

    if is_blank(parent.linked_student.as_deref()) {
        active.linked_student = Set(Some(student.id.clone()));
    }
    if is_blank(parent.phone.as_deref()) {
        if let Some(phone) = pick_extra(extra, PARENT_PHONE_KEYS) {
            active.phone = Set(Some(phone));
        }
    }
    if is_blank(parent.email.as_deref()) {
        if let Some(email) = pick_extra(extra, PARENT_EMAIL_KEYS) {
            active.email = Set(Some(email.to_lowercase()));
        }
    }
    if is_blank(parent.address.as_deref()) {
        let address = pick_extra(extra, PARENT_ADDRESS_KEYS).or_else(|| student.address.clone());
        if let Some(address) = address.filter(|a| !a.trim().is_empty()) {
            active.address = Set(Some(address));
        }
    }

    if !active.is_changed() {
        return Ok(false);
    }
    active.update(db).await?;
    Ok(true)
}

/// 导师没有院系时继承学生的院系
async fn fill_mentor_department(
    db: &DatabaseConnection,
    mentor_id: &str,
    dept_id: Option<&str>,
) -> Result<bool> {
    let Some(dept_id) = dept_id.filter(|d| !d.is_empty()) else {
        return Ok(false);
    };
    let Some(mentor) = faculty::Entity::find_by_id(mentor_id.to_string()).one(db).await? else {
        return Ok(false);
    };
    if !is_blank(mentor.dept_id.as_deref()) {
        return Ok(false);
    }
    let mut active: faculty::ActiveModel = mentor.into();
    active.dept_id = Set(Some(dept_id.to_string()));
    active.update(db).await?;
    Ok(true)
}

/// 遍历全部学生，补齐院系、家长、导师链接
pub async fn sync_student_relations(db: &DatabaseConnection) -> Result<SyncSummary> {
    let resolver = CreateIfMissingResolve::new(SeaOrmReferenceStore::new(db));
    let mut summary = SyncSummary::default();

    for student in students::Entity::find().all(db).await? {
        summary.students_scanned += 1;
        let extra = student.extra_json.as_deref();
        let mut dept_id = student.dept_id.clone().filter(|d| !d.is_empty());
        let mut parent_id = student.parent_id.clone().filter(|p| !p.is_empty());
        let mut mentor_id = student.mentor_id.clone().filter(|m| !m.is_empty());
        let mut active: students::ActiveModel = student.clone().into();

        if dept_id.is_none() {
            let raw = pick_extra(extra, DEPARTMENT_KEYS);
            let found =
                resolve_name(&resolver, ReferenceKind::Department, &student.roll, raw).await?;
            if let Some(id) = found {
                active.dept_id = Set(Some(id.clone()));
                dept_id = Some(id);
            }
        }

        if parent_id.is_none() {
            let linked = parents::Entity::find()
                .filter(parents::Column::LinkedStudent.eq(student.id.as_str()))
                .one(db)
                .await?;
            let found = match linked {
                Some(parent) => Some(parent.id),
                None => {
                    let raw = pick_extra(extra, PARENT_NAME_KEYS);
                    resolve_name(&resolver, ReferenceKind::Parent, &student.roll, raw).await?
                }
            };
            if let Some(id) = found {
                active.parent_id = Set(Some(id.clone()));
                parent_id = Some(id);
            }
        }
        if let Some(parent_id) = parent_id.as_deref() {
            if fill_parent(db, parent_id, &student).await? {
                summary.parents_updated += 1;
            }
        }

        if mentor_id.is_none() {
            let raw = pick_extra(extra, MENTOR_NAME_KEYS);
            let found =
                resolve_name(&resolver, ReferenceKind::Faculty, &student.roll, raw).await?;
            if let Some(id) = found {
                active.mentor_id = Set(Some(id.clone()));
                mentor_id = Some(id);
            }
        }
        if let Some(mentor_id) = mentor_id.as_deref() {
            if fill_mentor_department(db, mentor_id, dept_id.as_deref()).await? {
                summary.mentors_updated += 1;
            }
        }

        if active.is_changed() {
            active.update(db).await?;
            summary.students_updated += 1;
        }
    }

    summary.departments_created = resolver.created_count(ReferenceKind::Department);
    summary.parents_created = resolver.created_count(ReferenceKind::Parent);
    summary.mentors_created = resolver.created_count(ReferenceKind::Faculty);

    linfo!(
        "system",
        LogStage::Maintenance,
        LogComponent::Sync,
        "sync_relations",
        format!("relation sync finished: {summary:?}")
    );
    Ok(summary)
}

/// 从原始列补齐学生的空邮箱与空电话，返回更新的学生数
pub async fn normalize_students(db: &DatabaseConnection) -> Result<u64> {
    let mut updated = 0;

    for student in students::Entity::find().all(db).await? {
        let extra = student.extra_json.as_deref();
        let mut active: students::ActiveModel = student.clone().into();

        if is_blank(student.email.as_deref()) {
            if let Some(email) = pick_extra(extra, EMAIL_KEYS) {
                active.email = Set(Some(email.to_lowercase()));
            }
        }
        if is_blank(student.phone.as_deref()) {
            if let Some(phone) = pick_extra(extra, PHONE_KEYS) {
                active.phone = Set(Some(phone));
            }
        }

        if active.is_changed() {
            active.update(db).await?;
            updated += 1;
        }
    }

    linfo!(
        "system",
        LogStage::Maintenance,
        LogComponent::Sync,
        "normalize_students",
        format!("normalized {updated} students")
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("  ")));
        assert!(!is_blank(Some("x")));
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let json = serde_json::to_value(SyncSummary {
            students_scanned: 3,
            ..SyncSummary::default()
        })
        .unwrap();
        assert_eq!(json["studentsScanned"], 3);
        assert_eq!(json["departmentsCreated"], 0);
    }
}
