//! # 教师（导师）实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 教师实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "faculty")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub fid: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<Date>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub dept_id: Option<String>,
    pub salary: Option<f64>,
    pub user_id: Option<String>,
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
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
