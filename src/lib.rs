//! # Campus Portal Library
//!
//! 基于角色的校园管理 API 核心库

pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod management;
pub mod relations;
pub mod types;

// Re-export commonly used types
pub use app::AppContext;
pub use config::AppConfig;
pub use error::{PortalError, Result};
