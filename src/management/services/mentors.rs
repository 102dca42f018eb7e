//! # 导师视图服务
//!
//! 导师只能看到本院系的学生

use entity::{faculty, students};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use serde_json::Value;

use super::faculty::populate_faculty;
use super::profiles::{StudentDetail, attendance_of, exams_of, student_detail};
use super::students::populate_students;
use crate::error::{PortalError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::lwarn;
use crate::relations::metrics::{attendance_percent, department_averages, raw_gpa};
use crate::relations::{MentorProfiles, resolve_own_record};

pub const OTHER_DEPARTMENT_MESSAGE: &str = "Cannot access student from different department";

#[derive(Debug, Serialize)]
pub struct MentorStudents {
    pub count: usize,
    pub students: Vec<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorStats {
    pub student_count: usize,
    pub avg_attendance: u32,
    #[serde(rename = "avgGPA")]
    pub avg_gpa: f64,
    pub dept_id: Option<String>,
}

fn department_of(mentor: &faculty::Model) -> Option<&str> {
    mentor.dept_id.as_deref().filter(|d| !d.is_empty())
}

/// 导师视图
pub struct MentorService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MentorService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn own_record(&self, account_id: &str) -> Result<faculty::Model> {
        resolve_own_record(&MentorProfiles::new(self.db), account_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Faculty", account_id))
    }

    /// 本院系的学生，导师没有院系时为空
    async fn department_students(&self, mentor: &faculty::Model) -> Result<Vec<students::Model>> {
        let Some(dept_id) = department_of(mentor) else {
            return Ok(Vec::new());
        };
        Ok(students::Entity::find()
            .filter(students::Column::DeptId.eq(dept_id))
            .order_by_asc(students::Column::Roll)
            .all(self.db)
            .await?)
    }

    pub async fn profile(&self, account_id: &str) -> Result<Value> {
        let mentor = self.own_record(account_id).await?;
        populate_faculty(self.db, std::slice::from_ref(&mentor))
            .await?
            .pop()
            .ok_or_else(|| PortalError::internal("populate returned no record"))
    }

    pub async fn students(&self, account_id: &str) -> Result<MentorStudents> {
        let mentor = self.own_record(account_id).await?;
        let records = self.department_students(&mentor).await?;
        let students = populate_students(self.db, &records).await?;
        Ok(MentorStudents {
            count: students.len(),
            students,
        })
    }

    /// 单个学生及其指标，跨院系访问返回 403
    pub async fn student(&self, account_id: &str, roll: &str) -> Result<StudentDetail> {
        let mentor = self.own_record(account_id).await?;
        let student = students::Entity::find()
            .filter(students::Column::Roll.eq(roll))
            .one(self.db)
            .await?
            .ok_or_else(|| PortalError::not_found("Student", roll))?;

        let same_department = department_of(&mentor)
            .is_some_and(|dept| student.dept_id.as_deref() == Some(dept));
        if !same_department {
            lwarn!(
                account_id,
                LogStage::Auth,
                LogComponent::RoleGate,
                "cross_department_access",
                format!("mentor {} denied student {roll}", mentor.fid)
            );
            return Err(PortalError::forbidden(OTHER_DEPARTMENT_MESSAGE));
        }
        student_detail(self.db, &student).await
    }

    /// 院系平均出勤率与平均绩点
    pub async fn stats(&self, account_id: &str) -> Result<MentorStats> {
        let mentor = self.own_record(account_id).await?;
        let records = self.department_students(&mentor).await?;

        let mut per_student = Vec::with_capacity(records.len());
        for student in &records {
            let attendance = attendance_of(self.db, &student.roll).await?;
            let exams = exams_of(self.db, &student.roll).await?;
            per_student.push((attendance_percent(&attendance), raw_gpa(&exams)));
        }
        let (avg_attendance, avg_gpa) = department_averages(&per_student);

        Ok(MentorStats {
            student_count: records.len(),
            avg_attendance,
            avg_gpa,
            dept_id: department_of(&mentor).map(str::to_string),
        })
    }
}
