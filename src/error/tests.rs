//! # 错误处理测试

use crate::error::{Context, ErrorCategory, PortalError};
use axum::http::StatusCode;
use std::error::Error;

#[test]
fn test_config_error_creation() {
    let err = PortalError::config("测试配置错误");
    assert!(matches!(err, PortalError::Config { .. }));
    assert_eq!(err.to_string(), "配置错误: 测试配置错误");
    assert_eq!(err.category(), ErrorCategory::Server);
}

#[test]
fn test_config_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "文件不存在");
    let err = PortalError::config_with_source("配置文件加载失败", io_err);

    assert!(err.to_string().contains("配置错误: 配置文件加载失败"));
    assert!(err.source().is_some());
}

#[test]
fn test_status_mapping() {
    let cases = [
        (PortalError::unauthenticated("No token, authorization denied"), StatusCode::UNAUTHORIZED),
        (PortalError::invalid_token("Token is not valid"), StatusCode::UNAUTHORIZED),
        (PortalError::forbidden("Admin only"), StatusCode::FORBIDDEN),
        (PortalError::validation("Roll already exists"), StatusCode::BAD_REQUEST),
        (PortalError::not_found("Student", "x"), StatusCode::NOT_FOUND),
        (PortalError::payload_too_large("Upload too large"), StatusCode::PAYLOAD_TOO_LARGE),
        (PortalError::database("boom"), StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (err, status) in cases {
        assert_eq!(err.to_http_response_parts().0, status, "{err}");
    }
}

#[test]
fn test_client_message_hides_server_details() {
    let err = PortalError::database_with_source("连接失败", anyhow::anyhow!("disk full"));
    assert_eq!(err.client_message(), "Server error");

    let err = PortalError::not_found("Student", "65a4c3f0aa11bb22cc33dd44");
    assert_eq!(err.client_message(), "Student not found");

    let err = PortalError::validation_field("Name and roll required", "roll");
    assert_eq!(err.client_message(), "Name and roll required");
    assert_eq!(err.field(), Some("roll"));
}

#[test]
fn test_context_keeps_source_status() {
    let result: Result<(), PortalError> = Err(PortalError::validation("Invalid role"));
    let err = result.context("注册账户").unwrap_err();

    assert!(matches!(err, PortalError::Context { .. }));
    assert_eq!(err.to_http_response_parts().0, StatusCode::BAD_REQUEST);
    assert_eq!(err.client_message(), "Invalid role");
    assert!(err.to_string().starts_with("注册账户: "));
}

#[test]
fn test_auto_conversion_from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "文件不存在");
    let portal_err: PortalError = io_err.into();

    assert!(matches!(portal_err, PortalError::Io { .. }));
    assert_eq!(portal_err.to_string(), "IO错误: 文件操作失败");
}

#[test]
fn test_macros_build_errors() {
    let err = crate::portal_err!(validation, "{} already exists", "Roll");
    assert_eq!(err.client_message(), "Roll already exists");

    fn check(value: &str) -> crate::error::Result<()> {
        crate::ensure_valid!(!value.is_empty(), "Missing fields");
        Ok(())
    }
    assert!(check("x").is_ok());
    assert_eq!(check("").unwrap_err().client_message(), "Missing fields");
}
