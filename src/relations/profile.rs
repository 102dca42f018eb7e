//! # 自助档案解析
//!
//! 把已登录的学生/导师/家长账户映射到其本人的档案记录。
//! 先按回链 `userId` 查找，找不到时按邮箱、姓名忽略大小写匹配，
//! 并在回链为空时写回账户标识。

use crate::auth::UserRole;
use crate::error::Result;
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, linfo};

/// 档案类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Student,
    Mentor,
    Parent,
}

impl ProfileKind {
    /// 能够认领该类档案的账户角色
    #[must_use]
    pub const fn role(&self) -> UserRole {
        match self {
            Self::Student => UserRole::Student,
            Self::Mentor => UserRole::Mentor,
            Self::Parent => UserRole::Parent,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Mentor => "Mentor",
            Self::Parent => "Parent",
        }
    }
}

/// 忽略大小写的精确匹配条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileMatcher {
    EmailEquals(String),
    NameEquals(String),
}

/// 匹配所需的账户信息
#[derive(Debug, Clone)]
pub struct ProfileAccount {
    pub name: String,
    pub email: String,
    pub role: Option<UserRole>,
}

impl ProfileAccount {
    /// 依次为邮箱、姓名，空值跳过
    #[must_use]
    pub fn matchers(&self) -> Vec<ProfileMatcher> {
        let mut matchers = Vec::with_capacity(2);
        let email = self.email.trim();
        if !email.is_empty() {
            matchers.push(ProfileMatcher::EmailEquals(email.to_string()));
        }
        let name = self.name.trim();
        if !name.is_empty() {
            matchers.push(ProfileMatcher::NameEquals(name.to_string()));
        }
        matchers
    }
}

/// 档案存储
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    type Record: Send + Sync;

    fn kind(&self) -> ProfileKind;

    async fn find_by_user_id(&self, account_id: &str) -> Result<Option<Self::Record>>;

    async fn load_account(&self, account_id: &str) -> Result<Option<ProfileAccount>>;

    async fn find_by_matcher(&self, matcher: &ProfileMatcher) -> Result<Option<Self::Record>>;

    /// 记录当前的账户回链
    fn user_id<'r>(&self, record: &'r Self::Record) -> Option<&'r str>;

    /// 写入账户回链并返回更新后的记录
    async fn bind_account(&self, record: Self::Record, account_id: &str) -> Result<Self::Record>;
}

/// 解析账户本人的档案，找不到时返回 `None`
pub async fn resolve_own_record<S: ProfileStore + ?Sized>(
    store: &S,
    account_id: &str,
) -> Result<Option<S::Record>> {
    if let Some(record) = store.find_by_user_id(account_id).await? {
        return Ok(Some(record));
    }

    let Some(account) = store.load_account(account_id).await? else {
        return Ok(None);
    };
    let kind = store.kind();
    if account.role != Some(kind.role()) {
        ldebug!(
            account_id,
            LogStage::Resolve,
            LogComponent::Profile,
            "role_mismatch",
            format!("account role {:?} cannot claim a {} profile", account.role, kind.label())
        );
        return Ok(None);
    }

    for matcher in account.matchers() {
        let Some(record) = store.find_by_matcher(&matcher).await? else {
            continue;
        };
        // 已绑定其他账户的记录原样返回，不改写回链
        if store.user_id(&record).is_some_and(|bound| !bound.is_empty()) {
            return Ok(Some(record));
        }
        let record = store.bind_account(record, account_id).await?;
        linfo!(
            account_id,
            LogStage::Resolve,
            LogComponent::Profile,
            "bind_account",
            format!("{} profile linked via {matcher:?}", kind.label())
        );
        return Ok(Some(record));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: String,
        email: String,
        user_id: Option<String>,
    }

    struct SpyStore {
        rows: Mutex<Vec<Row>>,
        account: Option<ProfileAccount>,
        matcher_calls: AtomicUsize,
    }

    impl SpyStore {
        fn new(rows: Vec<Row>, account: Option<ProfileAccount>) -> Self {
            Self {
                rows: Mutex::new(rows),
                account,
                matcher_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ProfileStore for SpyStore {
        type Record = Row;

        fn kind(&self) -> ProfileKind {
            ProfileKind::Student
        }

        async fn find_by_user_id(&self, account_id: &str) -> Result<Option<Row>> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|row| row.user_id.as_deref() == Some(account_id))
                .cloned())
        }

        async fn load_account(&self, _account_id: &str) -> Result<Option<ProfileAccount>> {
            Ok(self.account.clone())
        }

        async fn find_by_matcher(&self, matcher: &ProfileMatcher) -> Result<Option<Row>> {
            self.matcher_calls.fetch_add(1, Ordering::SeqCst);
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .find(|row| match matcher {
                    ProfileMatcher::EmailEquals(email) => row.email.eq_ignore_ascii_case(email),
                    ProfileMatcher::NameEquals(name) => row.name.eq_ignore_ascii_case(name),
                })
                .cloned())
        }

        fn user_id<'r>(&self, record: &'r Row) -> Option<&'r str> {
            record.user_id.as_deref()
        }

        async fn bind_account(&self, record: Row, account_id: &str) -> Result<Row> {
            let mut rows = self.rows.lock().unwrap();
            let stored = rows
                .iter_mut()
                .find(|row| row.name == record.name)
                .unwrap();
            stored.user_id = Some(account_id.to_string());
            Ok(stored.clone())
        }
    }

    fn student_account(name: &str, email: &str) -> ProfileAccount {
        ProfileAccount {
            name: name.to_string(),
            email: email.to_string(),
            role: Some(UserRole::Student),
        }
    }

    #[tokio::test]
    async fn test_links_once_then_uses_fast_path() {
        let store = SpyStore::new(
            vec![Row {
                name: "Alice".to_string(),
                email: String::new(),
                user_id: None,
            }],
            Some(student_account("alice", "alice@school.test")),
        );

        let first = resolve_own_record(&store, "acc-1").await.unwrap().unwrap();
        assert_eq!(first.user_id.as_deref(), Some("acc-1"));
        // email 未命中、name 命中
        assert_eq!(store.matcher_calls.load(Ordering::SeqCst), 2);

        let second = resolve_own_record(&store, "acc-1").await.unwrap().unwrap();
        assert_eq!(second, first);
        assert_eq!(store.matcher_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_role_mismatch_returns_none() {
        let mut account = student_account("Alice", "");
        account.role = Some(UserRole::Parent);
        let store = SpyStore::new(
            vec![Row {
                name: "Alice".to_string(),
                email: String::new(),
                user_id: None,
            }],
            Some(account),
        );

        assert!(resolve_own_record(&store, "acc-1").await.unwrap().is_none());
        assert_eq!(store.matcher_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_never_overwrites_existing_back_reference() {
        let store = SpyStore::new(
            vec![Row {
                name: "Alice".to_string(),
                email: String::new(),
                user_id: Some("acc-other".to_string()),
            }],
            Some(student_account("Alice", "")),
        );

        let record = resolve_own_record(&store, "acc-1").await.unwrap().unwrap();
        assert_eq!(record.user_id.as_deref(), Some("acc-other"));
    }

    #[tokio::test]
    async fn test_unknown_account_and_no_match() {
        let store = SpyStore::new(Vec::new(), None);
        assert!(resolve_own_record(&store, "acc-1").await.unwrap().is_none());

        let store = SpyStore::new(Vec::new(), Some(student_account("Bob", "bob@school.test")));
        assert!(resolve_own_record(&store, "acc-1").await.unwrap().is_none());
        assert_eq!(store.matcher_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_matchers_skip_blank_values() {
        let account = student_account("  ", " a@b.c ");
        assert_eq!(
            account.matchers(),
            vec![ProfileMatcher::EmailEquals("a@b.c".to_string())]
        );
    }
}
