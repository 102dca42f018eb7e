//! # 学生实体定义
//!
//! 学号 `roll` 是全系统通用的自然键

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 学生实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub roll: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<Date>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub dept_id: Option<String>,
    pub parent_id: Option<String>,
    pub mentor_id: Option<String>,
    #[sea_orm(unique)]
    pub user_id: Option<String>,
    pub file_name: Option<String>,
    pub file_data: Option<String>,
    /// 导入时未映射的原始列（JSON 对象文本）
    #[sea_orm(column_type = "Text", nullable)]
    pub extra_json: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DeptId",
        to = "super::departments::Column::Id"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::parents::Entity",
        from = "Column::ParentId",
        to = "super::parents::Column::Id"
    )]
    Parent,
    #[sea_orm(
        belongs_to = "super::faculty::Entity",
        from = "Column::MentorId",
        to = "super::faculty::Column::Id"
    )]
    Mentor,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
