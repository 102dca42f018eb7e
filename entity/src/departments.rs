//! # 院系实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 院系实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "departments")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    #[serde(rename = "_id")]
    pub id: String,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    /// 历史导入数据中的文本编号
    #[sea_orm(unique)]
    #[serde(rename = "id")]
    pub legacy_id: Option<String>,
    pub description: Option<String>,
    /// 系主任（faculty 记录）
    pub hod: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::faculty::Entity",
        from = "Column::Hod",
        to = "super::faculty::Column::Id"
    )]
    Hod,
}

impl Related<super::faculty::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
