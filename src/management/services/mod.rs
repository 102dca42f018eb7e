//! # 管理端服务层
//!
//! 聚合各业务域的逻辑，供 HTTP handler 与命令行入口复用。

pub mod accounts;
pub mod auth;
pub mod catalog;
pub mod departments;
pub mod faculty;
pub mod mentors;
pub mod parents;
pub mod profiles;
pub mod records;
pub mod resource;
pub mod sessions;
pub mod shared;
pub mod students;
pub mod transfer;

pub use accounts::{AccountService, CreateAdminRequest, UserStats};
pub use auth::{AccountView, AuthResponse, AuthService, LoginRequest, RegisterRequest};
pub use catalog::{CoursesResource, SubjectsResource};
pub use departments::DepartmentsResource;
pub use faculty::FacultyResource;
pub use mentors::MentorService;
pub use parents::ParentsResource;
pub use profiles::{ParentSelfService, StudentSelfService};
pub use records::{AttendanceResource, ExamsResource, FeesResource};
pub use resource::AdminResource;
pub use sessions::{CreateSessionRequest, SessionService, UpdateSessionRequest};
pub use students::StudentsResource;
