//! # 管理数据资源
//!
//! `/admin/data/<entity>` 下每类记录的统一增删改查接口

use sea_orm::DatabaseConnection;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{PortalError, Result};
use crate::relations::{RefRequest, Resolution, SeaOrmReferenceStore, StrictResolve, resolve_all};

/// 交互式表单使用的严格解析器
#[must_use]
pub fn strict_resolver(db: &DatabaseConnection) -> StrictResolve<SeaOrmReferenceStore<'_>> {
    StrictResolve::new(SeaOrmReferenceStore::new(db))
}

/// 写入前严格解析一组引用字段，任一失败则整体失败
pub async fn resolve_refs<const N: usize>(
    db: &DatabaseConnection,
    requests: [RefRequest; N],
) -> Result<[Resolution; N]> {
    resolve_all(&strict_resolver(db), &requests)
        .await?
        .try_into()
        .map_err(|_| PortalError::internal("reference resolution count mismatch"))
}

/// 一类管理数据
#[async_trait::async_trait]
pub trait AdminResource: Default + Send + Sync + 'static {
    /// 创建与更新共用的请求体，字段全部可选
    type Payload: DeserializeOwned + Send + 'static;
    /// 写入后返回的记录
    type Record: Serialize + Send + 'static;

    /// 资源名，用于 `<资源> not found` 与 `<资源> deleted`
    const LABEL: &'static str;

    /// 列出全部记录，引用字段替换为摘要
    async fn list(&self, db: &DatabaseConnection) -> Result<Vec<Value>>;

    async fn create(&self, db: &DatabaseConnection, payload: Self::Payload) -> Result<Self::Record>;

    /// 部分更新，请求体中缺失的字段保持不变
    async fn update(
        &self,
        db: &DatabaseConnection,
        id: &str,
        payload: Self::Payload,
    ) -> Result<Self::Record>;

    async fn delete(&self, db: &DatabaseConnection, id: &str) -> Result<()>;
}
