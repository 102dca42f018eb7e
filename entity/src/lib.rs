//! # Entity 模块
//!
//! 包含所有 Sea-ORM 实体定义

pub mod accounts;
pub mod attendance;
pub mod counseling_sessions;
pub mod courses;
pub mod departments;
pub mod exams;
pub mod faculty;
pub mod fees;
pub mod parents;
pub mod students;
pub mod subjects;

pub use accounts::Entity as Accounts;
pub use attendance::Entity as Attendance;
pub use counseling_sessions::Entity as CounselingSessions;
pub use courses::Entity as Courses;
pub use departments::Entity as Departments;
pub use exams::Entity as Exams;
pub use faculty::Entity as Faculty;
pub use fees::Entity as Fees;
pub use parents::Entity as Parents;
pub use students::Entity as Students;
pub use subjects::Entity as Subjects;
