//! # 自助档案服务
//!
//! 学生、家长查看本人档案及成绩、出勤、学费

use entity::{attendance, exams, fees, parents, students};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use serde_json::Value;

use super::parents::populate_parents;
use super::students::populate_students;
use crate::error::{PortalError, Result};
use crate::relations::metrics::{
    AttendanceSummary, FeeSummary, attendance_summary, fee_summary, gpa,
};
use crate::relations::{ParentProfiles, StudentProfiles, resolve_own_record};

pub async fn attendance_of(db: &DatabaseConnection, roll: &str) -> Result<Vec<attendance::Model>> {
    Ok(attendance::Entity::find()
        .filter(attendance::Column::StudentRoll.eq(roll))
        .order_by_desc(attendance::Column::Date)
        .all(db)
        .await?)
}

pub async fn exams_of(db: &DatabaseConnection, roll: &str) -> Result<Vec<exams::Model>> {
    Ok(exams::Entity::find()
        .filter(exams::Column::Roll.eq(roll))
        .order_by_asc(exams::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn fees_of(db: &DatabaseConnection, roll: &str) -> Result<Vec<fees::Model>> {
    Ok(fees::Entity::find()
        .filter(fees::Column::Roll.eq(roll))
        .order_by_asc(fees::Column::CreatedAt)
        .all(db)
        .await?)
}

/// 出勤明细
#[derive(Debug, Serialize)]
pub struct AttendanceReport {
    pub records: Vec<attendance::Model>,
    pub total: usize,
    pub present: usize,
    pub percentage: u32,
}

/// 考试明细
#[derive(Debug, Serialize)]
pub struct ExamReport {
    pub exams: Vec<exams::Model>,
    pub count: usize,
    pub gpa: f64,
}

/// 学费明细
#[derive(Debug, Serialize)]
pub struct FeeReport {
    pub fees: Vec<fees::Model>,
    pub total: f64,
    pub paid: f64,
    pub pending: f64,
}

#[derive(Debug, Serialize)]
pub struct ExamMetrics {
    pub count: usize,
    pub gpa: f64,
    pub records: Vec<exams::Model>,
}

/// 导师、家长视图共用的学生指标
#[derive(Debug, Serialize)]
pub struct StudentMetrics {
    pub attendance: AttendanceSummary,
    pub exams: ExamMetrics,
    pub fees: FeeSummary,
}

/// 学生档案及指标
#[derive(Debug, Serialize)]
pub struct StudentDetail {
    pub student: Value,
    pub metrics: StudentMetrics,
}

pub async fn student_metrics(db: &DatabaseConnection, roll: &str) -> Result<StudentMetrics> {
    let attendance = attendance_of(db, roll).await?;
    let exams = exams_of(db, roll).await?;
    let fees = fees_of(db, roll).await?;
    Ok(StudentMetrics {
        attendance: attendance_summary(&attendance),
        exams: ExamMetrics {
            count: exams.len(),
            gpa: gpa(&exams),
            records: exams,
        },
        fees: fee_summary(&fees),
    })
}

/// 联表后的单个学生
pub async fn populated_student(
    db: &DatabaseConnection,
    student: &students::Model,
) -> Result<Value> {
    populate_students(db, std::slice::from_ref(student))
        .await?
        .pop()
        .ok_or_else(|| PortalError::internal("populate returned no record"))
}

pub async fn student_detail(
    db: &DatabaseConnection,
    student: &students::Model,
) -> Result<StudentDetail> {
    Ok(StudentDetail {
        student: populated_student(db, student).await?,
        metrics: student_metrics(db, &student.roll).await?,
    })
}

/// 学生本人视图
pub struct StudentSelfService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StudentSelfService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 解析账户对应的学生记录，必要时补上回链
    pub async fn own_record(&self, account_id: &str) -> Result<students::Model> {
        resolve_own_record(&StudentProfiles::new(self.db), account_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Student", account_id))
    }

    pub async fn profile(&self, account_id: &str) -> Result<Value> {
        let student = self.own_record(account_id).await?;
        populated_student(self.db, &student).await
    }

    pub async fn attendance(&self, account_id: &str) -> Result<AttendanceReport> {
        let student = self.own_record(account_id).await?;
        let records = attendance_of(self.db, &student.roll).await?;
        let summary = attendance_summary(&records);
        Ok(AttendanceReport {
            records,
            total: summary.total,
            present: summary.present,
            percentage: summary.percentage,
        })
    }

    pub async fn exams(&self, account_id: &str) -> Result<ExamReport> {
        let student = self.own_record(account_id).await?;
        let exams = exams_of(self.db, &student.roll).await?;
        Ok(ExamReport {
            count: exams.len(),
            gpa: gpa(&exams),
            exams,
        })
    }

    pub async fn fees(&self, account_id: &str) -> Result<FeeReport> {
        let student = self.own_record(account_id).await?;
        let fees = fees_of(self.db, &student.roll).await?;
        let summary = fee_summary(&fees);
        Ok(FeeReport {
            fees,
            total: summary.total,
            paid: summary.paid,
            pending: summary.pending,
        })
    }
}

/// 家长本人视图
pub struct ParentSelfService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ParentSelfService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn own_record(&self, account_id: &str) -> Result<parents::Model> {
        resolve_own_record(&ParentProfiles::new(self.db), account_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Parent", account_id))
    }

    pub async fn profile(&self, account_id: &str) -> Result<Value> {
        let parent = self.own_record(account_id).await?;
        populate_parents(self.db, std::slice::from_ref(&parent))
            .await?
            .pop()
            .ok_or_else(|| PortalError::internal("populate returned no record"))
    }

    /// 关联的学生：优先 `linkedStudent`，其次 `parentId` 指向本人的学生
    pub async fn linked_student(&self, account_id: &str) -> Result<StudentDetail> {
        let parent = self.own_record(account_id).await?;
        let linked = match parent.linked_student.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => students::Entity::find_by_id(id.to_string()).one(self.db).await?,
            None => None,
        };
        let student = match linked {
            Some(student) => Some(student),
            None => {
                students::Entity::find()
                    .filter(students::Column::ParentId.eq(parent.id.as_str()))
                    .one(self.db)
                    .await?
            }
        };
        let Some(student) = student else {
            return Err(PortalError::not_found("Student", parent.id));
        };
        student_detail(self.db, &student).await
    }
}
