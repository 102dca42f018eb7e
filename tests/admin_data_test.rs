//! # 管理员数据接口测试
//!
//! 学号唯一、部分更新、自然键解析、管理员删除保护、CSV 导入与关系对账

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use campus_portal::auth::UserRole;
use common::{id_of, spawn_app, spawn_app_with};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[tokio::test]
async fn test_roll_must_be_unique() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    app.create(&token, "students", json!({ "name": "First", "roll": "R100" })).await;

    let response = app
        .server
        .post("/api/admin/data/students")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Second", "roll": "R100" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["msg"], "Roll already exists");
    assert_eq!(body["field"], "roll");

    // 大小写不同视为不同学号
    app.create(&token, "students", json!({ "name": "Third", "roll": "r100" })).await;
}

#[tokio::test]
async fn test_student_requires_name_and_roll() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = app
        .server
        .post("/api/admin/data/students")
        .authorization_bearer(&token)
        .json(&json!({ "name": "   ", "roll": "R1" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["msg"], "Name and roll required");
}

#[tokio::test]
async fn test_partial_update_keeps_omitted_fields() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let student = app
        .create(&token, "students", json!({ "name": "Bob", "roll": "B1", "phone": "555" }))
        .await;
    let path = format!("/api/admin/data/students/{}", id_of(&student));

    let renamed: Value = app
        .server
        .put(&path)
        .authorization_bearer(&token)
        .json(&json!({ "name": "Robert" }))
        .await
        .json();
    assert_eq!(renamed["name"], "Robert");
    assert_eq!(renamed["phone"], "555");
    assert_eq!(renamed["roll"], "B1");

    let cleared: Value = app
        .server
        .put(&path)
        .authorization_bearer(&token)
        .json(&json!({ "phone": "" }))
        .await
        .json();
    assert_eq!(cleared["phone"], Value::Null);
    assert_eq!(cleared["name"], "Robert");

    let blank_name = app
        .server
        .put(&path)
        .authorization_bearer(&token)
        .json(&json!({ "name": "" }))
        .await;
    blank_name.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_department_code_resolves_to_record_id() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let dept = app
        .create(&token, "departments", json!({ "code": "CSE", "name": "Computer Science" }))
        .await;
    let student = app
        .create(&token, "students", json!({ "name": "Bob", "roll": "B1", "deptId": "CSE" }))
        .await;
    assert_eq!(student["deptId"], dept["_id"]);

    // 列表接口返回院系摘要
    let listed: Value = app
        .server
        .get("/api/admin/data/students")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(listed[0]["deptId"]["name"], "Computer Science");
    assert_eq!(listed[0]["deptId"]["_id"], dept["_id"]);

    // 管理端不会自动创建院系
    let unknown = app
        .server
        .post("/api/admin/data/students")
        .authorization_bearer(&token)
        .json(&json!({ "name": "Carol", "roll": "C1", "deptId": "CSE-X" }))
        .await;
    unknown.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(unknown.json::<Value>()["field"], "deptId");
}

#[tokio::test]
async fn test_missing_and_malformed_ids_are_not_found() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let exam = json!({ "roll": "B1", "subject": "Math", "examName": "Mid", "marks": 80 });
    let exam = app.create(&token, "exams", exam).await;
    let path = format!("/api/admin/data/exams/{}", id_of(&exam));

    let deleted = app.server.delete(&path).authorization_bearer(&token).await;
    deleted.assert_status_ok();
    assert_eq!(deleted.json::<Value>()["msg"], "Exam record deleted");

    app.server
        .delete(&path)
        .authorization_bearer(&token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .put("/api/admin/data/exams/not-an-id")
        .authorization_bearer(&token)
        .json(&json!({ "marks": 10 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_attendance_status_is_validated() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = app
        .server
        .post("/api/admin/data/attendance")
        .authorization_bearer(&token)
        .json(&json!({ "studentRoll": "B1", "date": "2024-03-01", "status": "sleeping" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    app.create(
        &token,
        "attendance",
        json!({ "studentRoll": "B1", "date": "2024-03-01", "status": "Present" }),
    )
    .await;
}

#[tokio::test]
async fn test_admin_deletion_guard() {
    let app = spawn_app().await;
    let me = app.account("Root", "root@campus.test", UserRole::Admin).await;
    let token = app.token_for(&me);
    let my_path = format!("/api/admin/data/admins/{}", me.id);

    let last = app.server.delete(&my_path).authorization_bearer(&token).await;
    last.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(last.json::<Value>()["msg"], "Cannot delete last admin");

    let other: Value = {
        let response = app
            .server
            .post("/api/admin/data/admins")
            .authorization_bearer(&token)
            .json(&json!({
                "name": "Deputy",
                "email": "deputy@campus.test",
                "password": "deputy-pass",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    };
    assert_eq!(other["role"], "admin");

    let own = app.server.delete(&my_path).authorization_bearer(&token).await;
    own.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(own.json::<Value>()["msg"], "Cannot delete currently logged-in admin");

    let removed = app
        .server
        .delete(&format!("/api/admin/data/admins/{}", other["id"].as_str().unwrap()))
        .authorization_bearer(&token)
        .await;
    removed.assert_status_ok();
    assert_eq!(removed.json::<Value>()["msg"], "Admin deleted");

    let admins: Value = app
        .server
        .get("/api/admin/data/admins")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(admins.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_directory_and_stats() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    app.account("S1", "s1@campus.test", UserRole::Student).await;
    app.account("S2", "s2@campus.test", UserRole::Student).await;
    let mentor = app.account("M1", "m1@campus.test", UserRole::Mentor).await;

    let stats: Value = app
        .server
        .get("/api/admin/stats")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(stats["totalUsers"], 4);
    assert_eq!(stats["byRole"]["students"], 2);
    assert_eq!(stats["byRole"]["mentors"], 1);

    let user: Value = app
        .server
        .get(&format!("/api/admin/users/{}", mentor.id))
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(user["email"], "m1@campus.test");

    let removed = app
        .server
        .delete(&format!("/api/admin/users/{}", mentor.id))
        .authorization_bearer(&token)
        .await;
    removed.assert_status_ok();
    assert_eq!(removed.json::<Value>()["msg"], "User removed");
}

#[tokio::test]
async fn test_csv_import_then_sync_relations() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    app.create(&token, "students", json!({ "name": "Existing", "roll": "R1" })).await;

    let csv = "Roll No,Student Name,Department,Parent Name,Mentor Name\n\
               R1,Dup,Physics,Pat,Dr Who\n\
               R2,Dana,Physics,Pat Doe,Dr Who\n\
               R2,Dana Again,Physics,,\n\
               ,No Roll,Physics,,\n";
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(csv.as_bytes().to_vec())
            .file_name("students.csv")
            .mime_type("text/csv"),
    );
    let response = app
        .server
        .post("/api/admin/data/students/import")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "imported": 1, "skipped": 3 }));

    let summary: Value = app
        .server
        .post("/api/admin/data/sync-relations")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(summary["studentsScanned"], 2);
    assert_eq!(summary["departmentsCreated"], 1);
    assert_eq!(summary["parentsCreated"], 1);
    assert_eq!(summary["mentorsCreated"], 1);

    let snapshot: Value = app
        .server
        .get("/api/admin/data/export/all")
        .authorization_bearer(&token)
        .await
        .json();
    let dana = snapshot["students"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["roll"] == "R2")
        .unwrap()
        .clone();
    assert_eq!(dana["deptId"], snapshot["departments"][0]["_id"]);
    assert_eq!(dana["parentId"], snapshot["parents"][0]["_id"]);
    assert_eq!(snapshot["faculty"][0]["deptId"], dana["deptId"]);
    assert_eq!(snapshot["admins"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_import_without_file_field() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let form = MultipartForm::new().add_text("note", "nothing here");
    let response = app
        .server
        .post("/api/admin/data/students/import")
        .authorization_bearer(&token)
        .multipart(form)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["msg"], "No file uploaded");
}

fn csv_part(data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(data).file_name("students.csv").mime_type("text/csv"),
    )
}

#[tokio::test]
async fn test_import_accepts_file_above_two_megabytes() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let address = "A".repeat(1000);
    let mut csv = String::from("roll,name,address\n");
    for i in 0..3000 {
        csv.push_str(&format!("R{i},Student {i},{address}\n"));
    }
    assert!(csv.len() > 2 * 1024 * 1024);

    let response = app
        .server
        .post("/api/admin/data/students/import")
        .authorization_bearer(&token)
        .multipart(csv_part(csv.into_bytes()))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "imported": 3000, "skipped": 0 }));
}

#[tokio::test]
async fn test_import_over_configured_limit_is_rejected() {
    let app = spawn_app_with(|config| config.server.max_upload_bytes = 64 * 1024).await;
    let token = app.admin_token().await;

    let mut csv = String::from("roll,name\n");
    for i in 0..10_000 {
        csv.push_str(&format!("R{i},Student {i}\n"));
    }
    let response = app
        .server
        .post("/api/admin/data/students/import")
        .authorization_bearer(&token)
        .multipart(csv_part(csv.into_bytes()))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json::<Value>()["msg"], "Upload too large");
}

#[tokio::test]
async fn test_import_rejects_undecodable_csv() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = app
        .server
        .post("/api/admin/data/students/import")
        .authorization_bearer(&token)
        .multipart(csv_part(b"roll,name\nR1,\xff\xfeAnn\n".to_vec()))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["msg"], "CSV parse error");

    let students: Value = app
        .server
        .get("/api/admin/data/students")
        .authorization_bearer(&token)
        .await
        .json();
    assert!(students.as_array().unwrap().is_empty());
}
