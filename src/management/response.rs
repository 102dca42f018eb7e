//! # API 响应结构
//!
//! 成功响应直接返回记录本身，错误响应统一为 `{msg, code, field?}`

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::PortalError;

/// 仅含提示信息的响应体
#[derive(Debug, Clone, Serialize)]
pub struct MessageBody {
    pub msg: String,
}

/// 错误响应体
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub msg: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// 服务端错误详情，由请求 ID 中间件取出后写日志
#[derive(Debug, Clone)]
pub struct ServerErrorDetail(pub String);

/// # API响应枚举
///
/// 统一所有API出口，方便转换为 `axum::response::Response`
#[derive(Debug)]
pub enum ApiResponse<T: Serialize> {
    /// 200
    Ok(T),
    /// 201
    Created(T),
    /// 200 `{msg}`
    Message(String),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(data) => (StatusCode::OK, Json(data)).into_response(),
            Self::Created(data) => (StatusCode::CREATED, Json(data)).into_response(),
            Self::Message(msg) => (StatusCode::OK, Json(MessageBody { msg })).into_response(),
        }
    }
}

/// 删除成功等仅返回提示信息的场景
#[must_use]
pub fn message(msg: impl Into<String>) -> ApiResponse<()> {
    ApiResponse::Message(msg.into())
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let (status, code) = self.to_http_response_parts();
        let body = ErrorBody {
            msg: self.client_message(),
            code,
            field: self.field().map(str::to_string),
        };

        let mut response = (status, Json(body)).into_response();
        if status.is_server_error() {
            response
                .extensions_mut()
                .insert(ServerErrorDetail(error_chain(&self)));
        }
        response
    }
}

/// 拼接完整的错误来源链
fn error_chain(error: &PortalError) -> String {
    let mut text = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        text.push_str(" <- ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

/// JSON 请求体提取器，解析失败时返回验证错误
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = PortalError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(&rejection)),
        }
    }
}

fn json_rejection(rejection: &JsonRejection) -> PortalError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            PortalError::validation("Expected a JSON request body")
        }
        other => PortalError::validation(format!("Invalid JSON body: {}", other.body_text())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let response = PortalError::validation_field("Roll already exists", "roll").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.extensions().get::<ServerErrorDetail>().is_none());

        let json = body_json(response).await;
        assert_eq!(json["msg"], "Roll already exists");
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["field"], "roll");
    }

    #[tokio::test]
    async fn test_server_error_hides_detail() {
        let response = PortalError::database("disk I/O error").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response.extensions().get::<ServerErrorDetail>().cloned().unwrap();
        assert!(detail.0.contains("disk I/O error"));

        let json = body_json(response).await;
        assert_eq!(json["msg"], "Server error");
        assert!(json.get("field").is_none());
    }

    #[tokio::test]
    async fn test_message_response() {
        let response = message("Student deleted").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["msg"], "Student deleted");
    }
}
