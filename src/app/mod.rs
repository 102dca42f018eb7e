//! # 应用装配
//!
//! 共享服务实例的持有与构建

pub mod context;

pub use context::AppContext;
