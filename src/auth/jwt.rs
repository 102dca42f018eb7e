//! JWT token management
//!
//! Issues and validates the signed, time-boxed tokens carried by every
//! authenticated request.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;

use crate::auth::permissions::UserRole;
use crate::auth::types::{AuthConfig, JwtClaims};
use crate::error::{PortalError, Result};
use crate::ldebug;
use crate::logging::{LogComponent, LogStage};

/// Message returned for every token that fails verification
pub const INVALID_TOKEN_MESSAGE: &str = "Token is not valid";

/// JWT token manager
pub struct JwtManager {
    /// Encoding key
    encoding_key: EncodingKey,
    /// Decoding key
    decoding_key: DecodingKey,
    /// Validation configuration
    validation: Validation,
    /// Authentication configuration
    config: Arc<AuthConfig>,
}

impl JwtManager {
    /// Create new JWT manager
    pub fn new(config: Arc<AuthConfig>) -> Result<Self> {
        if config.jwt_secret.is_empty() {
            return Err(PortalError::config("JWT secret must not be empty"));
        }

        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 30; // 30 seconds tolerance

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Generate access token for an account
    pub fn generate_token(&self, account_id: &str, role: UserRole) -> Result<String> {
        let claims = JwtClaims::new(account_id, role, &self.config);
        self.encode_claims(&claims)
    }

    /// Sign arbitrary claims
    pub fn encode_claims(&self, claims: &JwtClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| crate::portal_err!(internal, "Token generation failed: {}", e))
    }

    /// Validate and parse token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                ldebug!(
                    "system",
                    LogStage::Auth,
                    LogComponent::AuthGate,
                    "token_rejected",
                    format!("token rejected: {:?}", e.kind())
                );
                PortalError::InvalidToken {
                    message: INVALID_TOKEN_MESSAGE.to_string(),
                    source: Some(e.into()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Get configuration reference
    #[must_use]
    pub fn get_config(&self) -> &AuthConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-key-for-jwt-testing".to_string(),
            token_ttl: 3600,
            ..AuthConfig::default()
        }
    }

    fn create_test_manager() -> JwtManager {
        JwtManager::new(Arc::new(test_config())).unwrap()
    }

    #[test]
    fn test_token_generation_and_validation() {
        let manager = create_test_manager();

        let token = manager
            .generate_token("65a4c3f0aa11bb22cc33dd44", UserRole::Mentor)
            .unwrap();

        let claims = manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "65a4c3f0aa11bb22cc33dd44");
        assert_eq!(claims.role, UserRole::Mentor);
        assert!(!claims.is_expired());

        let identity = claims.identity();
        assert_eq!(identity.account_id, "65a4c3f0aa11bb22cc33dd44");
        assert!(!identity.is_admin());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let manager = create_test_manager();
        let mut claims =
            JwtClaims::new("65a4c3f0aa11bb22cc33dd44", UserRole::Student, &test_config());
        claims.iat = Utc::now().timestamp() - 7200;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = manager.encode_claims(&claims).unwrap();

        let err = manager.validate_token(&token).unwrap_err();
        assert!(matches!(err, PortalError::InvalidToken { .. }));
        assert_eq!(err.client_message(), INVALID_TOKEN_MESSAGE);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let other = JwtManager::new(Arc::new(AuthConfig {
            jwt_secret: "another-secret-key-entirely".to_string(),
            ..test_config()
        }))
        .unwrap();
        let token = other.generate_token("65a4c3f0aa11bb22cc33dd44", UserRole::Admin).unwrap();

        assert!(create_test_manager().validate_token(&token).is_err());
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let manager = create_test_manager();
        assert!(manager.validate_token("not.a.token").is_err());
        assert!(manager.validate_token("").is_err());
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let result = JwtManager::new(Arc::new(AuthConfig {
            jwt_secret: String::new(),
            ..test_config()
        }));
        assert!(matches!(result, Err(PortalError::Config { .. })));
    }
}
