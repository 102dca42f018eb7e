//! # 档案存储的 sea-orm 实现

use entity::{accounts, faculty, parents, students};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::auth::UserRole;
use crate::error::Result;

use super::profile::{ProfileAccount, ProfileKind, ProfileMatcher, ProfileStore};
use super::store::lower_eq;

async fn load_profile_account(
    db: &DatabaseConnection,
    account_id: &str,
) -> Result<Option<ProfileAccount>> {
    let account = accounts::Entity::find_by_id(account_id.to_string()).one(db).await?;
    Ok(account.map(|account| ProfileAccount {
        role: UserRole::parse(&account.role),
        name: account.name,
        email: account.email,
    }))
}

/// 学生档案
pub struct StudentProfiles<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> StudentProfiles<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl ProfileStore for StudentProfiles<'_> {
    type Record = students::Model;

    fn kind(&self) -> ProfileKind {
        ProfileKind::Student
    }

    async fn find_by_user_id(&self, account_id: &str) -> Result<Option<students::Model>> {
        Ok(students::Entity::find()
            .filter(students::Column::UserId.eq(account_id))
            .one(self.db)
            .await?)
    }

    async fn load_account(&self, account_id: &str) -> Result<Option<ProfileAccount>> {
        load_profile_account(self.db, account_id).await
    }

    async fn find_by_matcher(&self, matcher: &ProfileMatcher) -> Result<Option<students::Model>> {
        let condition = match matcher {
            ProfileMatcher::EmailEquals(email) => lower_eq(students::Column::Email, email),
            ProfileMatcher::NameEquals(name) => lower_eq(students::Column::Name, name),
        };
        Ok(students::Entity::find().filter(condition).one(self.db).await?)
    }

    fn user_id<'r>(&self, record: &'r students::Model) -> Option<&'r str> {
        record.user_id.as_deref()
    }

    async fn bind_account(
        &self,
        record: students::Model,
        account_id: &str,
    ) -> Result<students::Model> {
        let mut active: students::ActiveModel = record.into();
        active.user_id = Set(Some(account_id.to_string()));
        Ok(active.update(self.db).await?)
    }
}

/// 导师档案
pub struct MentorProfiles<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MentorProfiles<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl ProfileStore for MentorProfiles<'_> {
    type Record = faculty::Model;

    fn kind(&self) -> ProfileKind {
        ProfileKind::Mentor
    }

    async fn find_by_user_id(&self, account_id: &str) -> Result<Option<faculty::Model>> {
        Ok(faculty::Entity::find()
            .filter(faculty::Column::UserId.eq(account_id))
            .one(self.db)
            .await?)
    }

    async fn load_account(&self, account_id: &str) -> Result<Option<ProfileAccount>> {
        load_profile_account(self.db, account_id).await
    }

    async fn find_by_matcher(&self, matcher: &ProfileMatcher) -> Result<Option<faculty::Model>> {
        let condition = match matcher {
            ProfileMatcher::EmailEquals(email) => lower_eq(faculty::Column::Email, email),
            ProfileMatcher::NameEquals(name) => lower_eq(faculty::Column::Name, name),
        };
        Ok(faculty::Entity::find().filter(condition).one(self.db).await?)
    }

    fn user_id<'r>(&self, record: &'r faculty::Model) -> Option<&'r str> {
        record.user_id.as_deref()
    }

    async fn bind_account(
        &self,
        record: faculty::Model,
        account_id: &str,
    ) -> Result<faculty::Model> {
        let mut active: faculty::ActiveModel = record.into();
        active.user_id = Set(Some(account_id.to_string()));
        Ok(active.update(self.db).await?)
    }
}

/// 家长档案
pub struct ParentProfiles<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ParentProfiles<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl ProfileStore for ParentProfiles<'_> {
    type Record = parents::Model;

    fn kind(&self) -> ProfileKind {
        ProfileKind::Parent
    }

    async fn find_by_user_id(&self, account_id: &str) -> Result<Option<parents::Model>> {
        Ok(parents::Entity::find()
            .filter(parents::Column::UserId.eq(account_id))
            .one(self.db)
            .await?)
    }

    async fn load_account(&self, account_id: &str) -> Result<Option<ProfileAccount>> {
        load_profile_account(self.db, account_id).await
    }

    async fn find_by_matcher(&self, matcher: &ProfileMatcher) -> Result<Option<parents::Model>> {
        let condition = match matcher {
            ProfileMatcher::EmailEquals(email) => lower_eq(parents::Column::Email, email),
            ProfileMatcher::NameEquals(name) => lower_eq(parents::Column::Name, name),
        };
        Ok(parents::Entity::find().filter(condition).one(self.db).await?)
    }

    fn user_id<'r>(&self, record: &'r parents::Model) -> Option<&'r str> {
        record.user_id.as_deref()
    }

    async fn bind_account(
        &self,
        record: parents::Model,
        account_id: &str,
    ) -> Result<parents::Model> {
        let mut active: parents::ActiveModel = record.into();
        active.user_id = Set(Some(account_id.to_string()));
        Ok(active.update(self.db).await?)
    }
}
