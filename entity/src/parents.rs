//! # 家长实体定义
//!
//! `pid` 与 `parent_id` 为同一公开编号的两个历史字段名

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 家长实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parents")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub pid: String,
    #[sea_orm(unique)]
    pub parent_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub linked_student: Option<String>,
    pub user_id: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::LinkedStudent",
        to = "super::students::Column::Id"
    )]
    LinkedStudent,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkedStudent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
