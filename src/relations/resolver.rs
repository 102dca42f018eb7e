//! # 关系解析器
//!
//! 把人工输入的引用值（院系代码、家长编号、学号……）转换为内部记录标识。
//! 交互式表单使用 [`StrictResolve`]，批量对账工具使用 [`CreateIfMissingResolve`]。

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{PortalError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, linfo};

use super::reference::{NaturalKeyField, RefInput, ReferenceKind, Resolution, classify};

/// 解析器依赖的存储能力
#[async_trait::async_trait]
pub trait ReferenceStore: Send + Sync {
    /// 按单个自然键字段精确匹配，返回命中的记录标识
    async fn find_ids(
        &self,
        kind: ReferenceKind,
        field: NaturalKeyField,
        value: &str,
    ) -> Result<Vec<String>>;

    /// 名称忽略大小写匹配
    async fn find_ids_by_name_ci(&self, kind: ReferenceKind, name: &str) -> Result<Vec<String>>;

    /// 以名称创建占位记录，不支持自动创建的类型返回 `None`
    async fn create_placeholder(&self, kind: ReferenceKind, name: &str) -> Result<Option<String>>;
}

/// 解析策略
#[async_trait::async_trait]
pub trait ResolveStrategy: Send + Sync {
    async fn resolve(&self, kind: ReferenceKind, input: &RefInput) -> Result<Resolution>;
}

enum Lookup {
    Found(String),
    Ambiguous(NaturalKeyField, usize),
    Missing,
}

/// 依次尝试各自然键字段，首个有命中的字段决定结果
async fn lookup_natural_key<S: ReferenceStore + ?Sized>(
    store: &S,
    kind: ReferenceKind,
    key: &str,
) -> Result<Lookup> {
    for field in kind.natural_keys() {
        let mut ids = store.find_ids(kind, *field, key).await?;
        match ids.len() {
            0 => {}
            1 => return Ok(Lookup::Found(ids.remove(0))),
            count => return Ok(Lookup::Ambiguous(*field, count)),
        }
    }
    Ok(Lookup::Missing)
}

fn missing_message(kind: ReferenceKind, key: &str) -> String {
    format!(
        "{kind} '{key}' not found (expected {})",
        kind.expected_fields()
    )
}

fn ambiguous_message(
    kind: ReferenceKind,
    key: &str,
    field: NaturalKeyField,
    count: usize,
) -> String {
    format!("{kind} '{key}' matches {count} records by {field}")
}

/// 严格解析：找不到即报错，从不创建记录
pub struct StrictResolve<S> {
    store: S,
}

impl<S: ReferenceStore> StrictResolve<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait::async_trait]
impl<S: ReferenceStore> ResolveStrategy for StrictResolve<S> {
    async fn resolve(&self, kind: ReferenceKind, input: &RefInput) -> Result<Resolution> {
        let key = match input {
            RefInput::Absent => return Ok(Resolution::NotProvided),
            RefInput::Null => return Ok(Resolution::ExplicitNull),
            RefInput::RawRef(id) => return Ok(Resolution::Resolved(id.clone())),
            RefInput::NaturalKey(key) => key,
        };

        let resolution = match lookup_natural_key(&self.store, kind, key).await? {
            Lookup::Found(id) => Resolution::Resolved(id),
            Lookup::Ambiguous(field, count) => {
                Resolution::Error(ambiguous_message(kind, key, field, count))
            }
            Lookup::Missing => Resolution::Error(missing_message(kind, key)),
        };

        ldebug!(
            "system",
            LogStage::Resolve,
            LogComponent::Resolver,
            "strict_resolve",
            format!("{kind} '{key}' -> {resolution:?}")
        );
        Ok(resolution)
    }
}

/// 对账解析：依次尝试自然键、忽略大小写的名称，最后自动创建
pub struct CreateIfMissingResolve<S> {
    store: S,
    created: [AtomicU64; 5],
}

impl<S: ReferenceStore> CreateIfMissingResolve<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            created: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// 本策略已创建的某类记录数
    #[must_use]
    pub fn created_count(&self, kind: ReferenceKind) -> u64 {
        self.created[kind.index()].load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl<S: ReferenceStore> ResolveStrategy for CreateIfMissingResolve<S> {
    async fn resolve(&self, kind: ReferenceKind, input: &RefInput) -> Result<Resolution> {
        let key = match input {
            RefInput::Absent => return Ok(Resolution::NotProvided),
            RefInput::Null => return Ok(Resolution::ExplicitNull),
            RefInput::RawRef(id) => return Ok(Resolution::Resolved(id.clone())),
            RefInput::NaturalKey(key) => key,
        };

        match lookup_natural_key(&self.store, kind, key).await? {
            Lookup::Found(id) => return Ok(Resolution::Resolved(id)),
            Lookup::Ambiguous(field, count) => {
                return Ok(Resolution::Error(ambiguous_message(kind, key, field, count)));
            }
            Lookup::Missing => {}
        }

        if let Some(id) = self.store.find_ids_by_name_ci(kind, key).await?.into_iter().next() {
            return Ok(Resolution::Resolved(id));
        }

        // 并发请求可能同时创建同名记录，唯一约束会拒绝其中之一
        match self.store.create_placeholder(kind, key).await? {
            Some(id) => {
                self.created[kind.index()].fetch_add(1, Ordering::Relaxed);
                linfo!(
                    "system",
                    LogStage::Resolve,
                    LogComponent::Resolver,
                    "create_placeholder",
                    format!("created {kind} '{key}' as {id}")
                );
                Ok(Resolution::Resolved(id))
            }
            None => Ok(Resolution::Error(missing_message(kind, key))),
        }
    }
}

/// 单个待解析字段
#[derive(Debug, Clone)]
pub struct RefRequest {
    /// 请求体中的字段名，如 `deptId`
    pub field: &'static str,
    pub kind: ReferenceKind,
    input: std::result::Result<RefInput, String>,
}

impl RefRequest {
    #[must_use]
    pub const fn new(field: &'static str, kind: ReferenceKind, input: RefInput) -> Self {
        Self {
            field,
            kind,
            input: Ok(input),
        }
    }

    /// 从 JSON 原始值构建，值的形状不合法时记为解析错误
    #[must_use]
    pub fn json(
        field: &'static str,
        kind: ReferenceKind,
        raw: Option<Option<&serde_json::Value>>,
    ) -> Self {
        Self {
            field,
            kind,
            input: classify(raw).map_err(|reason| format!("Invalid {field}: {reason}")),
        }
    }
}

/// 在任何写入前解析全部引用字段
///
/// 任一字段失败则整体失败，错误信息汇总所有失败字段，`field` 指向第一个
pub async fn resolve_all<R: ResolveStrategy + ?Sized>(
    strategy: &R,
    requests: &[RefRequest],
) -> Result<Vec<Resolution>> {
    let mut resolutions = Vec::with_capacity(requests.len());
    let mut errors: Vec<(&'static str, String)> = Vec::new();

    for request in requests {
        let resolution = match &request.input {
            Ok(input) => strategy.resolve(request.kind, input).await?,
            Err(reason) => Resolution::Error(reason.clone()),
        };
        if let Some(message) = resolution.error() {
            errors.push((request.field, message.to_string()));
        }
        resolutions.push(resolution);
    }

    if let Some((field, _)) = errors.first() {
        let message = errors
            .iter()
            .map(|(_, message)| message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(PortalError::validation_field(message, *field));
    }

    Ok(resolutions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// 内存存储，记录查询次数
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<HashMap<(ReferenceKind, NaturalKeyField, String), Vec<String>>>,
        lookups: AtomicU64,
        next_id: AtomicU64,
    }

    impl MemoryStore {
        fn insert(&self, kind: ReferenceKind, field: NaturalKeyField, value: &str, id: &str) {
            self.rows
                .lock()
                .unwrap()
                .entry((kind, field, value.to_string()))
                .or_default()
                .push(id.to_string());
        }
    }

    #[async_trait::async_trait]
    impl ReferenceStore for MemoryStore {
        async fn find_ids(
            &self,
            kind: ReferenceKind,
            field: NaturalKeyField,
            value: &str,
        ) -> Result<Vec<String>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .lock()
                .unwrap()
                .get(&(kind, field, value.to_string()))
                .cloned()
                .unwrap_or_default())
        }

        async fn find_ids_by_name_ci(
            &self,
            kind: ReferenceKind,
            name: &str,
        ) -> Result<Vec<String>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .filter(|((k, f, v), _)| {
                    *k == kind && *f == NaturalKeyField::Name && v.eq_ignore_ascii_case(name)
                })
                .flat_map(|(_, ids)| ids.clone())
                .collect())
        }

        async fn create_placeholder(
            &self,
            kind: ReferenceKind,
            name: &str,
        ) -> Result<Option<String>> {
            if kind == ReferenceKind::Student {
                return Ok(None);
            }
            let id = format!("{:024x}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            self.insert(kind, NaturalKeyField::Name, name, &id);
            Ok(Some(id))
        }
    }

    const CSE_ID: &str = "65a4c3f0aa11bb22cc33dd44";

    fn seeded() -> MemoryStore {
        let store = MemoryStore::default();
        store.insert(ReferenceKind::Department, NaturalKeyField::Code, "CSE", CSE_ID);
        store.insert(
            ReferenceKind::Department,
            NaturalKeyField::Name,
            "Computer Science",
            CSE_ID,
        );
        store
    }

    #[tokio::test]
    async fn test_strict_trusts_record_ids_without_lookup() {
        let strict = StrictResolve::new(MemoryStore::default());
        let input = RefInput::from_text(Some("0123456789abcdef01234567"));

        let resolution = strict.resolve(ReferenceKind::Department, &input).await.unwrap();
        assert_eq!(
            resolution,
            Resolution::Resolved("0123456789abcdef01234567".to_string())
        );
        assert_eq!(strict.store().lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_strict_natural_key_hit_and_miss() {
        let strict = StrictResolve::new(seeded());

        let hit = strict
            .resolve(ReferenceKind::Department, &RefInput::from_text(Some("CSE")))
            .await
            .unwrap();
        assert_eq!(hit, Resolution::Resolved(CSE_ID.to_string()));

        let by_name = strict
            .resolve(
                ReferenceKind::Department,
                &RefInput::from_text(Some("Computer Science")),
            )
            .await
            .unwrap();
        assert_eq!(by_name, Resolution::Resolved(CSE_ID.to_string()));

        let miss = strict
            .resolve(ReferenceKind::Department, &RefInput::from_text(Some("CSE-X")))
            .await
            .unwrap();
        let message = miss.error().unwrap();
        assert!(message.contains("CSE-X"));
        assert!(message.contains("code, name or id"));
    }

    #[tokio::test]
    async fn test_strict_absent_and_null() {
        let strict = StrictResolve::new(seeded());
        assert_eq!(
            strict.resolve(ReferenceKind::Parent, &RefInput::Absent).await.unwrap(),
            Resolution::NotProvided
        );
        assert_eq!(
            strict.resolve(ReferenceKind::Parent, &RefInput::Null).await.unwrap(),
            Resolution::ExplicitNull
        );
        assert_eq!(strict.store().lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_strict_reports_ambiguous_match() {
        let store = MemoryStore::default();
        store.insert(ReferenceKind::Parent, NaturalKeyField::Name, "Smith", "a");
        store.insert(ReferenceKind::Parent, NaturalKeyField::Name, "Smith", "b");
        let strict = StrictResolve::new(store);

        let resolution = strict
            .resolve(ReferenceKind::Parent, &RefInput::from_text(Some("Smith")))
            .await
            .unwrap();
        assert!(resolution.error().unwrap().contains("matches 2 records"));
    }

    #[tokio::test]
    async fn test_create_if_missing_prefers_existing_then_creates() {
        let resolver = CreateIfMissingResolve::new(seeded());

        let existing = resolver
            .resolve(
                ReferenceKind::Department,
                &RefInput::from_text(Some("computer science")),
            )
            .await
            .unwrap();
        assert_eq!(existing, Resolution::Resolved(CSE_ID.to_string()));
        assert_eq!(resolver.created_count(ReferenceKind::Department), 0);

        let created = resolver
            .resolve(ReferenceKind::Department, &RefInput::from_text(Some("Physics")))
            .await
            .unwrap();
        assert!(created.resolved().is_some());
        assert_eq!(resolver.created_count(ReferenceKind::Department), 1);

        let again = resolver
            .resolve(ReferenceKind::Department, &RefInput::from_text(Some("Physics")))
            .await
            .unwrap();
        assert_eq!(again, created);
        assert_eq!(resolver.created_count(ReferenceKind::Department), 1);
    }

    #[tokio::test]
    async fn test_create_if_missing_without_placeholder_support() {
        let resolver = CreateIfMissingResolve::new(MemoryStore::default());
        let resolution = resolver
            .resolve(ReferenceKind::Student, &RefInput::from_text(Some("R404")))
            .await
            .unwrap();
        assert!(resolution.error().is_some());
    }

    #[tokio::test]
    async fn test_resolve_all_collects_every_error() {
        let strict = StrictResolve::new(seeded());
        let requests = vec![
            RefRequest::new("deptId", ReferenceKind::Department, RefInput::from_text(Some("NOPE"))),
            RefRequest::new("parentId", ReferenceKind::Parent, RefInput::from_text(Some("P-1"))),
            RefRequest::new("mentorId", ReferenceKind::Faculty, RefInput::Absent),
        ];

        let err = resolve_all(&strict, &requests).await.unwrap_err();
        assert_eq!(err.field(), Some("deptId"));
        let message = err.client_message();
        assert!(message.contains("NOPE"));
        assert!(message.contains("P-1"));
        assert!(message.contains("; "));
    }

    #[tokio::test]
    async fn test_resolve_all_success_keeps_order() {
        let strict = StrictResolve::new(seeded());
        let requests = vec![
            RefRequest::new("deptId", ReferenceKind::Department, RefInput::from_text(Some("CSE"))),
            RefRequest::json("parentId", ReferenceKind::Parent, Some(None)),
        ];

        let resolutions = resolve_all(&strict, &requests).await.unwrap();
        assert_eq!(
            resolutions,
            vec![Resolution::Resolved(CSE_ID.to_string()), Resolution::ExplicitNull]
        );
    }
}
