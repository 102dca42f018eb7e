//! # 认证与闸门 API 测试

mod common;

use axum::http::StatusCode;
use campus_portal::auth::UserRole;
use common::{PASSWORD, spawn_app};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;
    let response = app.server.get("/api/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "ok" }));
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_register_then_login() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "Alice", "email": " Alice@Campus.Test ", "password": PASSWORD }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["user"]["email"], "alice@campus.test");
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("passwordHash").is_none());

    let claims = app
        .context
        .jwt
        .validate_token(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.role, UserRole::Student);

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@campus.test", "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["user"]["name"], "Alice");
}

#[tokio::test]
async fn test_register_rejections() {
    let app = spawn_app().await;

    let missing = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "NoPass", "email": "np@campus.test" }))
        .await;
    missing.assert_status(StatusCode::BAD_REQUEST);

    let admin = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Mallory",
            "email": "m@campus.test",
            "password": PASSWORD,
            "role": "admin",
        }))
        .await;
    admin.assert_status(StatusCode::FORBIDDEN);

    let bad_role = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Eve",
            "email": "e@campus.test",
            "password": PASSWORD,
            "role": "janitor",
        }))
        .await;
    bad_role.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad_role.json::<Value>()["msg"], "Invalid role");

    app.account("Taken", "taken@campus.test", UserRole::Mentor).await;
    let duplicate = app
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "Again", "email": "taken@campus.test", "password": PASSWORD }))
        .await;
    duplicate.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.json::<Value>()["msg"], "Email already registered");
}

#[tokio::test]
async fn test_login_failures_share_message() {
    let app = spawn_app().await;
    app.account("Bob", "bob@campus.test", UserRole::Student).await;

    for body in [
        json!({ "email": "bob@campus.test", "password": "wrong-password" }),
        json!({ "email": "nobody@campus.test", "password": PASSWORD }),
    ] {
        let response = app.server.post("/api/auth/login").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["msg"], "Invalid credentials");
    }

    let missing = app.server.post("/api/auth/login").json(&json!({})).await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(missing.json::<Value>()["msg"], "Missing fields");
}

#[tokio::test]
async fn test_auth_gate_and_role_gate() {
    let app = spawn_app().await;

    let anonymous = app.server.get("/api/admin/data/students").await;
    anonymous.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.json::<Value>()["msg"], "No token, authorization denied");

    let blank = app
        .server
        .get("/api/admin/data/students")
        .authorization_bearer("")
        .await;
    blank.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(blank.json::<Value>()["code"], "UNAUTHENTICATED");
    assert_eq!(blank.json::<Value>()["msg"], "No token, authorization denied");

    let forged = app
        .server
        .get("/api/admin/data/students")
        .authorization_bearer("not-a-real-token")
        .await;
    forged.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(forged.json::<Value>()["msg"], "Token is not valid");

    let student = app.account("Stu", "stu@campus.test", UserRole::Student).await;
    let token = app.token_for(&student);
    let denied = app
        .server
        .get("/api/admin/data/students")
        .authorization_bearer(&token)
        .await;
    denied.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(denied.json::<Value>()["msg"], "Admin only");

    let admin_token = app.admin_token().await;
    app.server
        .get("/api/admin/data/students")
        .authorization_bearer(&admin_token)
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_malformed_json_body_is_validation_error() {
    let app = spawn_app().await;
    let response = app
        .server
        .post("/api/auth/login")
        .content_type("application/json")
        .bytes("{not json".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
}
