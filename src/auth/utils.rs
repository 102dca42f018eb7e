//! # 认证工具函数

use axum::http::HeaderMap;

/// 认证凭据所在的请求头
pub const AUTH_HEADER: &str = "authorization";

/// 认证工具类
pub struct AuthUtils;

impl AuthUtils {
    /// `从HTTP头中提取Authorization头的值`
    #[must_use]
    pub fn extract_authorization_header(headers: &HeaderMap) -> Option<String> {
        headers
            .get(AUTH_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    /// 从 Authorization 头中取出令牌
    ///
    /// 头部按单个空格恰好分成两段且第一段为 `Bearer` 时取第二段，
    /// 否则整个头部值视为令牌；空头部或 `Bearer` 后为空时返回 `None`
    #[must_use]
    pub fn extract_token(auth_header: &str) -> Option<String> {
        if auth_header.trim().is_empty() {
            return None;
        }
        let parts: Vec<&str> = auth_header.split(' ').collect();
        match parts.as_slice() {
            ["Bearer", ""] => None,
            ["Bearer", token] => Some((*token).to_string()),
            _ => Some(auth_header.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    #[rstest]
    #[case("Bearer abc.def.ghi", Some("abc.def.ghi"))]
    #[case("abc.def.ghi", Some("abc.def.ghi"))]
    #[case("Bearer ", None)]
    #[case("Token abc", Some("Token abc"))]
    #[case("Bearer a b", Some("Bearer a b"))]
    #[case("bearer abc", Some("bearer abc"))]
    #[case("", None)]
    #[case("   ", None)]
    fn test_extract_token(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(AuthUtils::extract_token(header).as_deref(), expected);
    }

    #[test]
    fn test_extract_authorization_header_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer xyz"));
        assert_eq!(
            AuthUtils::extract_authorization_header(&headers).as_deref(),
            Some("Bearer xyz")
        );
    }
}
