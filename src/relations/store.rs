//! # 基于 sea-orm 的引用存储

use chrono::Utc;
use entity::{courses, departments, faculty, parents, students};
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, Set,
};

use crate::error::Result;
use crate::types::new_record_id;

use super::reference::{NaturalKeyField, ReferenceKind};
use super::resolver::ReferenceStore;

/// 查询满足条件的记录标识
async fn ids_where<E>(
    db: &DatabaseConnection,
    id_column: E::Column,
    condition: SimpleExpr,
) -> Result<Vec<String>>
where
    E: EntityTrait,
{
    Ok(E::find()
        .select_only()
        .column(id_column)
        .filter(condition)
        .into_tuple::<String>()
        .all(db)
        .await?)
}

/// `lower(column) = lower(value)`
pub(crate) fn lower_eq<C: ColumnTrait>(column: C, value: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).eq(value.to_lowercase())
}

/// 大写并把非字母数字连续段替换为 `-`
#[must_use]
pub fn upper_slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for ch in value.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_uppercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// 院系代码：名称前四个字母数字字符
#[must_use]
pub fn department_code_base(name: &str) -> Option<String> {
    let code: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(4)
        .collect::<String>()
        .to_ascii_uppercase();
    (!code.is_empty()).then_some(code)
}

/// 候选序列：`base`、`base-1`、`base-2`……
fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}

pub struct SeaOrmReferenceStore<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SeaOrmReferenceStore<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    async fn department_code_taken(&self, code: &str) -> Result<bool> {
        let count = departments::Entity::find()
            .filter(
                departments::Column::Code
                    .eq(code)
                    .or(departments::Column::LegacyId.eq(code)),
            )
            .count(self.db)
            .await?;
        Ok(count > 0)
    }

    async fn pid_taken(&self, pid: &str) -> Result<bool> {
        let count = parents::Entity::find()
            .filter(parents::Column::Pid.eq(pid).or(parents::Column::ParentId.eq(pid)))
            .count(self.db)
            .await?;
        Ok(count > 0)
    }

    async fn fid_taken(&self, fid: &str) -> Result<bool> {
        let count = faculty::Entity::find()
            .filter(faculty::Column::Fid.eq(fid))
            .count(self.db)
            .await?;
        Ok(count > 0)
    }

    /// 生成未被占用的院系代码
    pub async fn unique_department_code(&self, name: &str) -> Result<String> {
        let base = match department_code_base(name) {
            Some(code) => code,
            None => {
                let existing = departments::Entity::find().count(self.db).await?;
                format!("DEPT-{}", existing + 1)
            }
        };
        let mut attempt = 0;
        loop {
            let code = candidate(&base, attempt);
            if !self.department_code_taken(&code).await? {
                return Ok(code);
            }
            attempt += 1;
        }
    }

    /// 生成未被占用的家长编号 `PID-<SLUG>`
    pub async fn unique_pid(&self, seed: &str) -> Result<String> {
        let slug = upper_slug(seed);
        let base = format!("PID-{}", if slug.is_empty() { "PARENT" } else { &slug });
        let mut attempt = 0;
        loop {
            let pid = candidate(&base, attempt);
            if !self.pid_taken(&pid).await? {
                return Ok(pid);
            }
            attempt += 1;
        }
    }

    /// 生成未被占用的教师编号
    pub async fn unique_fid(&self, name: &str) -> Result<String> {
        let mut base = upper_slug(name);
        base.truncate(32);
        if base.is_empty() {
            base = "MENTOR".to_string();
        }
        let mut attempt = 0;
        loop {
            let fid = candidate(&base, attempt);
            if !self.fid_taken(&fid).await? {
                return Ok(fid);
            }
            attempt += 1;
        }
    }
}

#[async_trait::async_trait]
impl ReferenceStore for SeaOrmReferenceStore<'_> {
    async fn find_ids(
        &self,
        kind: ReferenceKind,
        field: NaturalKeyField,
        value: &str,
    ) -> Result<Vec<String>> {
        use NaturalKeyField as F;
        use ReferenceKind as K;

        let db = self.db;
        match (kind, field) {
            (K::Department, F::Code) => {
                ids_where::<departments::Entity>(
                    db,
                    departments::Column::Id,
                    departments::Column::Code.eq(value),
                )
                .await
            }
            (K::Department, F::Name) => {
                ids_where::<departments::Entity>(
                    db,
                    departments::Column::Id,
                    departments::Column::Name.eq(value),
                )
                .await
            }
            (K::Department, F::LegacyId) => {
                ids_where::<departments::Entity>(
                    db,
                    departments::Column::Id,
                    departments::Column::LegacyId.eq(value),
                )
                .await
            }
            (K::Parent, F::Pid) => {
                ids_where::<parents::Entity>(
                    db,
                    parents::Column::Id,
                    parents::Column::Pid.eq(value),
                )
                .await
            }
            (K::Parent, F::LegacyParentId) => {
                ids_where::<parents::Entity>(
                    db,
                    parents::Column::Id,
                    parents::Column::ParentId.eq(value),
                )
                .await
            }
            (K::Parent, F::Name) => {
                ids_where::<parents::Entity>(
                    db,
                    parents::Column::Id,
                    parents::Column::Name.eq(value),
                )
                .await
            }
            (K::Faculty, F::Fid) => {
                ids_where::<faculty::Entity>(
                    db,
                    faculty::Column::Id,
                    faculty::Column::Fid.eq(value),
                )
                .await
            }
            (K::Faculty, F::Name) => {
                ids_where::<faculty::Entity>(
                    db,
                    faculty::Column::Id,
                    faculty::Column::Name.eq(value),
                )
                .await
            }
            (K::Student, F::Roll) => {
                ids_where::<students::Entity>(
                    db,
                    students::Column::Id,
                    students::Column::Roll.eq(value),
                )
                .await
            }
            (K::Student, F::Name) => {
                ids_where::<students::Entity>(
                    db,
                    students::Column::Id,
                    students::Column::Name.eq(value),
                )
                .await
            }
            (K::Course, F::Code) => {
                ids_where::<courses::Entity>(
                    db,
                    courses::Column::Id,
                    courses::Column::Code.eq(value),
                )
                .await
            }
            (K::Course, F::Name) => {
                ids_where::<courses::Entity>(
                    db,
                    courses::Column::Id,
                    courses::Column::Name.eq(value),
                )
                .await
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn find_ids_by_name_ci(&self, kind: ReferenceKind, name: &str) -> Result<Vec<String>> {
        let db = self.db;
        match kind {
            ReferenceKind::Department => {
                ids_where::<departments::Entity>(
                    db,
                    departments::Column::Id,
                    lower_eq(departments::Column::Name, name),
                )
                .await
            }
            ReferenceKind::Parent => {
                ids_where::<parents::Entity>(
                    db,
                    parents::Column::Id,
                    lower_eq(parents::Column::Name, name),
                )
                .await
            }
            ReferenceKind::Faculty => {
                ids_where::<faculty::Entity>(
                    db,
                    faculty::Column::Id,
                    lower_eq(faculty::Column::Name, name),
                )
                .await
            }
            ReferenceKind::Student => {
                ids_where::<students::Entity>(
                    db,
                    students::Column::Id,
                    lower_eq(students::Column::Name, name),
                )
                .await
            }
            ReferenceKind::Course => {
                ids_where::<courses::Entity>(
                    db,
                    courses::Column::Id,
                    lower_eq(courses::Column::Name, name),
                )
                .await
            }
        }
    }

    async fn create_placeholder(&self, kind: ReferenceKind, name: &str) -> Result<Option<String>> {
        let now = Utc::now().naive_utc();
        let id = new_record_id();
        match kind {
            ReferenceKind::Department => {
                let code = self.unique_department_code(name).await?;
                departments::ActiveModel {
                    id: Set(id.clone()),
                    name: Set(name.to_string()),
                    code: Set(code.clone()),
                    legacy_id: Set(Some(code)),
                    description: Set(None),
                    hod: Set(None),
                    created_at: Set(now),
                }
                .insert(self.db)
                .await?;
            }
            ReferenceKind::Parent => {
                let pid = self.unique_pid(name).await?;
                parents::ActiveModel {
                    id: Set(id.clone()),
                    name: Set(name.to_string()),
                    pid: Set(pid.clone()),
                    parent_id: Set(Some(pid)),
                    email: Set(None),
                    phone: Set(None),
                    address: Set(None),
                    linked_student: Set(None),
                    user_id: Set(None),
                    created_at: Set(now),
                }
                .insert(self.db)
                .await?;
            }
            ReferenceKind::Faculty => {
                let fid = self.unique_fid(name).await?;
                faculty::ActiveModel {
                    id: Set(id.clone()),
                    name: Set(name.to_string()),
                    fid: Set(fid),
                    email: Set(None),
                    phone: Set(None),
                    dob: Set(None),
                    gender: Set(None),
                    address: Set(None),
                    dept_id: Set(None),
                    salary: Set(None),
                    user_id: Set(None),
                    created_at: Set(now),
                }
                .insert(self.db)
                .await?;
            }
            ReferenceKind::Student | ReferenceKind::Course => return Ok(None),
        }
        Ok(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_slug() {
        assert_eq!(upper_slug("  Dr. Jane  Doe "), "DR-JANE-DOE");
        assert_eq!(upper_slug("***"), "");
    }

    #[test]
    fn test_department_code_base() {
        assert_eq!(department_code_base("Computer Science"), Some("COMP".to_string()));
        assert_eq!(department_code_base("E&C"), Some("EC".to_string()));
        assert_eq!(department_code_base("--"), None);
    }

    #[test]
    fn test_candidate_suffixes() {
        assert_eq!(candidate("PID-ALICE", 0), "PID-ALICE");
        assert_eq!(candidate("PID-ALICE", 2), "PID-ALICE-2");
    }
}
