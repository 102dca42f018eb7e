//! # 路由配置
//!
//! 定义所有API路由和路由组织

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};

use crate::management::handlers::{
    admin_data, admin_users, auth, health, mentors, profiles, sessions,
};
use crate::management::middleware::{auth_gate, require_admin};
use crate::management::server::AppState;
use crate::management::services::{
    AdminResource, AttendanceResource, CoursesResource, DepartmentsResource, ExamsResource,
    FacultyResource, FeesResource, ParentsResource, StudentsResource, SubjectsResource,
};

/// 创建所有路由
pub fn create_routes(state: AppState) -> Router {
    let admin = Router::new()
        .nest("/admin/data", admin_data_routes())
        .merge(admin_user_routes())
        .route_layer(from_fn(require_admin));

    // 先注册的 layer 在内层，认证闸门最先执行
    let protected = Router::new()
        .merge(admin)
        .nest("/students", student_routes())
        .nest("/mentors", mentor_routes())
        .nest("/parents", parent_routes())
        .nest("/sessions", session_routes())
        .route_layer(from_fn_with_state(state.clone(), auth_gate));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .with_state(state)
}

/// 一类记录的增删改查路由
fn resource_routes<R: AdminResource>(router: Router<AppState>, segment: &str) -> Router<AppState> {
    router
        .route(
            &format!("/{segment}"),
            get(admin_data::list_records::<R>).post(admin_data::create_record::<R>),
        )
        .route(
            &format!("/{segment}/{{id}}"),
            put(admin_data::update_record::<R>).delete(admin_data::delete_record::<R>),
        )
}

/// 管理数据路由
fn admin_data_routes() -> Router<AppState> {
    let router = Router::new()
        .route("/students/import", post(admin_data::import_students_file))
        .route("/admins", get(admin_data::list_admins).post(admin_data::create_admin))
        .route("/admins/{id}", axum::routing::delete(admin_data::delete_admin))
        .route("/export/all", get(admin_data::export_everything))
        .route("/sync-relations", post(admin_data::sync_relations));

    let router = resource_routes::<StudentsResource>(router, "students");
    let router = resource_routes::<FacultyResource>(router, "faculty");
    let router = resource_routes::<ParentsResource>(router, "parents");
    let router = resource_routes::<DepartmentsResource>(router, "departments");
    let router = resource_routes::<CoursesResource>(router, "courses");
    let router = resource_routes::<SubjectsResource>(router, "subjects");
    let router = resource_routes::<AttendanceResource>(router, "attendance");
    let router = resource_routes::<ExamsResource>(router, "exams");
    resource_routes::<FeesResource>(router, "fees")
}

/// 账户管理路由
fn admin_user_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(admin_users::list_users))
        .route(
            "/admin/users/{id}",
            get(admin_users::get_user).delete(admin_users::delete_user),
        )
        .route("/admin/stats", get(admin_users::user_stats))
}

/// 学生自助路由
fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(profiles::student_me))
        .route("/me/attendance", get(profiles::student_attendance))
        .route("/me/exams", get(profiles::student_exams))
        .route("/me/fees", get(profiles::student_fees))
}

/// 导师视图路由
fn mentor_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(mentors::mentor_me))
        .route("/me/students", get(mentors::mentor_students))
        .route("/me/students/{roll}", get(mentors::mentor_student))
        .route("/me/stats", get(mentors::mentor_stats))
}

/// 家长视图路由
fn parent_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(profiles::parent_me))
        .route("/me/student", get(profiles::parent_student))
}

/// 辅导预约路由
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sessions::list_sessions).post(sessions::create_session))
        .route("/{id}", put(sessions::update_session))
}
