//! # 统计指标
//!
//! 出勤率、绩点、学费余额等纯函数，供学生、导师、家长视图复用

use entity::{attendance, exams, fees};
use serde::Serialize;

/// 出勤状态
pub const PRESENT: &str = "Present";

/// 保留两位小数
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub percentage: u32,
    pub present: usize,
    pub total: usize,
}

/// 未取整的出勤百分比，无记录时为 0
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn attendance_percent(records: &[attendance::Model]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let present = records.iter().filter(|r| r.status == PRESENT).count();
    present as f64 / records.len() as f64 * 100.0
}

#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn attendance_summary(records: &[attendance::Model]) -> AttendanceSummary {
    AttendanceSummary {
        percentage: attendance_percent(records).round() as u32,
        present: records.iter().filter(|r| r.status == PRESENT).count(),
        total: records.len(),
    }
}

/// 未取整的绩点：平均分 / 10，无记录时为 0
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn raw_gpa(records: &[exams::Model]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let sum: f64 = records.iter().map(|e| e.marks).sum();
    sum / records.len() as f64 / 10.0
}

#[must_use]
pub fn gpa(records: &[exams::Model]) -> f64 {
    round2(raw_gpa(records))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeeSummary {
    pub total: f64,
    pub paid: f64,
    /// 可能为负（多缴）
    pub pending: f64,
}

#[must_use]
pub fn fee_summary(records: &[fees::Model]) -> FeeSummary {
    let total: f64 = records.iter().map(|f| f.total).sum();
    let paid: f64 = records.iter().map(|f| f.paid).sum();
    FeeSummary {
        total,
        paid,
        pending: total - paid,
    }
}

/// 导师院系平均值：(平均出勤率取整, 平均绩点两位小数)
///
/// 输入为每名学生未取整的出勤百分比与绩点
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn department_averages(per_student: &[(f64, f64)]) -> (u32, f64) {
    if per_student.is_empty() {
        return (0, 0.0);
    }
    let count = per_student.len() as f64;
    let attendance: f64 = per_student.iter().map(|(a, _)| a).sum();
    let gpa: f64 = per_student.iter().map(|(_, g)| g).sum();
    ((attendance / count).round() as u32, round2(gpa / count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn attendance(status: &str) -> attendance::Model {
        attendance::Model {
            id: crate::types::new_record_id(),
            student_roll: "R1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            status: status.to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }

    fn exam(marks: f64) -> exams::Model {
        exams::Model {
            id: crate::types::new_record_id(),
            roll: "R1".to_string(),
            subject: "Math".to_string(),
            exam_name: "Midterm".to_string(),
            marks,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn fee(total: f64, paid: f64) -> fees::Model {
        fees::Model {
            id: crate::types::new_record_id(),
            roll: "R1".to_string(),
            total,
            paid,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_empty_inputs_are_zero() {
        let summary = attendance_summary(&[]);
        assert_eq!(summary.percentage, 0);
        assert_eq!(summary.total, 0);
        assert!(gpa(&[]).abs() < f64::EPSILON);
        assert_eq!(department_averages(&[]), (0, 0.0));
    }

    #[test]
    fn test_attendance_rounding() {
        let records = vec![attendance(PRESENT), attendance(PRESENT), attendance("Absent")];
        let summary = attendance_summary(&records);
        assert_eq!(summary.percentage, 67);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.total, 3);
    }

    #[test]
    fn test_gpa_formula() {
        let records = vec![exam(85.0), exam(90.0), exam(78.0)];
        assert!((gpa(&records) - 8.43).abs() < 1e-9);
    }

    #[test]
    fn test_overpaid_fee_is_negative() {
        let summary = fee_summary(&[fee(100.0, 150.0)]);
        assert!((summary.pending - -50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_department_averages_use_unrounded_inputs() {
        let (attendance, gpa) = department_averages(&[(66.666, 8.0), (50.0, 7.005)]);
        assert_eq!(attendance, 58);
        assert!((gpa - 7.5).abs() < 1e-9);
    }
}
