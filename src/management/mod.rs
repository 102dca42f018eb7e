//! # 管理API模块
//!
//! 提供校园门户的 RESTful API：认证、管理员数据维护、各角色自助视图与辅导预约

pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod services;

pub use routes::create_routes;
pub use server::{AppState, build_router, serve};
