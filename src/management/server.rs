//! # HTTP 服务器
//!
//! 组装路由与中间件，监听端口并支持 Ctrl-C 优雅关闭

use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::middleware::request_id_middleware;
use crate::app::AppContext;
use crate::config::ServerConfig;
use crate::error::{Context, PortalError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// 构建 CORS 层，`*` 表示允许任意来源
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                lwarn!(
                    "system",
                    LogStage::Startup,
                    LogComponent::Server,
                    "invalid_cors_origin",
                    format!("ignoring invalid CORS origin: {origin}")
                );
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// 创建完整的路由器
///
/// API 路由嵌套在 `api_prefix` 下；配置了静态目录时其余路径交给前端页面
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let api_routes = super::routes::create_routes(state);
    let mut app = Router::new().nest(&config.api_prefix, api_routes);

    if let Some(static_dir) = config.static_dir.as_deref() {
        let dir = std::path::Path::new(static_dir);
        if dir.exists() {
            linfo!(
                "system",
                LogStage::Startup,
                LogComponent::Server,
                "static_service_enabled",
                format!("serving static files from {static_dir}")
            );
            app = app.fallback_service(
                ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html"))),
            );
        } else {
            lwarn!(
                "system",
                LogStage::Startup,
                LogComponent::Server,
                "static_dir_not_found",
                format!("static directory {static_dir} not found, static files will not be served")
            );
        }
    }

    app.layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.cors_origins)),
        )
}

/// 监听并服务，收到 Ctrl-C 后优雅退出
pub async fn serve(context: Arc<AppContext>) -> Result<()> {
    let config = context.config.server.clone();
    let router = build_router(AppState::new(context), &config);
    let address = config.bind_address();

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Server,
        "listening",
        format!("campus portal listening on http://{address}{}", config.api_prefix)
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| PortalError::internal_with_source("HTTP server terminated", e))?;

    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Server,
        "stopped",
        "server stopped"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        lwarn!(
            "system",
            LogStage::Shutdown,
            LogComponent::Server,
            "signal_error",
            format!("failed to listen for ctrl-c: {err}")
        );
        std::future::pending::<()>().await;
    }
    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::Server,
        "shutdown_signal",
        "ctrl-c received, shutting down"
    );
}
