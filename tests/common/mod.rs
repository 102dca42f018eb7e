//! 集成测试公共设施：内存数据库 + 真实路由

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use campus_portal::auth::UserRole;
use campus_portal::config::{AppConfig, DatabaseConfig};
use campus_portal::management::{AppState, build_router};
use campus_portal::types::new_record_id;
use campus_portal::{AppContext, database};
use chrono::Utc;
use entity::accounts;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;

pub const PASSWORD: &str = "secret123";

pub struct TestApp {
    pub server: TestServer,
    pub context: Arc<AppContext>,
}

/// 单连接内存库，保证所有请求看到同一份数据
pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// 在默认测试配置上再做调整
pub async fn spawn_app_with(configure: impl FnOnce(&mut AppConfig)) -> TestApp {
    let mut config = AppConfig::default();
    config.database = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        connect_timeout: 5,
    };
    config.auth.bcrypt_cost = 4;
    configure(&mut config);

    let db = database::init_database(&config.database).await.unwrap();
    database::run_migrations(&db).await.unwrap();

    let context = Arc::new(AppContext::new(Arc::new(config), Arc::new(db)).unwrap());
    let router = build_router(
        AppState::new(Arc::clone(&context)),
        &context.config.server,
    );
    let server = TestServer::new(router).unwrap();
    TestApp { server, context }
}

impl TestApp {
    /// 直接写入一个账户
    pub async fn account(&self, name: &str, email: &str, role: UserRole) -> accounts::Model {
        accounts::ActiveModel {
            id: Set(new_record_id()),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            username: Set(Some(email.to_string())),
            password_hash: Set(self.context.passwords.hash(PASSWORD).unwrap()),
            role: Set(role.as_str().to_string()),
            created_at: Set(Utc::now().naive_utc()),
        }
        .insert(self.context.db())
        .await
        .unwrap()
    }

    pub fn token_for(&self, account: &accounts::Model) -> String {
        let role = UserRole::parse(&account.role).unwrap();
        self.context.jwt.generate_token(&account.id, role).unwrap()
    }

    /// 新建管理员并返回其令牌
    pub async fn admin_token(&self) -> String {
        let admin = self.account("Root Admin", "root@campus.test", UserRole::Admin).await;
        self.token_for(&admin)
    }

    /// 以管理员身份创建一条记录，返回响应体
    pub async fn create(&self, token: &str, entity: &str, body: Value) -> Value {
        let response = self
            .server
            .post(&format!("/api/admin/data/{entity}"))
            .authorization_bearer(token)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json()
    }
}

/// 响应体中的记录标识
pub fn id_of(record: &Value) -> String {
    record["_id"].as_str().unwrap().to_string()
}
