//! 健康检查相关处理器

use axum::Json;
use serde_json::{Value, json};

/// 存活检查，无需认证
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
