//! JWT token generation and validation.
//!
//! Provides JWT handling with access and refresh tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::{Claims, TokenKind, TokenPair};
use crate::config::JwtSettings;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expires_secs: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_expires_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_expires_secs: 15 * 60,
            refresh_token_expires_secs: 7 * 24 * 60 * 60,
        }
    }
}

impl From<&JwtSettings> for JwtConfig {
    fn from(settings: &JwtSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
            access_token_expires_secs: i64::try_from(settings.access_token_expiry_secs)
                .unwrap_or(i64::MAX),
            refresh_token_expires_secs: i64::try_from(settings.refresh_token_expiry_secs)
                .unwrap_or(i64::MAX),
        }
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is valid but issued for another purpose.
    #[error("wrong token kind")]
    WrongKind,
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expires_secs", &self.config.access_token_expires_secs)
            .field("refresh_token_expires_secs", &self.config.refresh_token_expires_secs)
            .field("keys", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generates an access token for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_access_token(&self, user_id: i32, login: &str) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::seconds(self.config.access_token_expires_secs);
        self.encode(&Claims::new(user_id, login, TokenKind::Access, expires_at))
    }

    /// Generates a refresh token for a user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_refresh_token(&self, user_id: i32, login: &str) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::seconds(self.config.refresh_token_expires_secs);
        self.encode(&Claims::new(user_id, login, TokenKind::Refresh, expires_at))
    }

    /// Generates both tokens for a freshly authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_pair(&self, user_id: i32, login: &str) -> Result<TokenPair, JwtError> {
        Ok(TokenPair::new(
            self.generate_access_token(user_id, login)?,
            self.generate_refresh_token(user_id, login)?,
            self.access_token_expires_in(),
        ))
    }

    /// Validates a token and checks that it was issued for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired,
    /// `JwtError::WrongKind` if it has another purpose, and
    /// `JwtError::DecodingError` if it is malformed.
    pub fn validate_token(&self, token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })?;

        if claims.kind == kind {
            Ok(claims)
        } else {
            Err(JwtError::WrongKind)
        }
    }

    /// Returns the access token expiration in seconds.
    #[must_use]
    pub const fn access_token_expires_in(&self) -> i64 {
        self.config.access_token_expires_secs
    }

    fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            ..JwtConfig::default()
        })
    }

    #[test]
    fn test_generate_access_token() {
        let service = create_test_service();
        let token = service.generate_access_token(7, "bot").unwrap();
        assert!(!token.is_empty());
    }

    #[test]
    fn test_validate_token() {
        let service = create_test_service();
        let token = service.generate_access_token(7, "bot").unwrap();
        let claims = service.validate_token(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.user_id(), 7);
        assert_eq!(claims.login, "bot");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let service = create_test_service();
        let pair = service.generate_pair(7, "bot").unwrap();

        assert!(matches!(
            service.validate_token(&pair.refresh_token, TokenKind::Access),
            Err(JwtError::WrongKind)
        ));
        assert!(
            service
                .validate_token(&pair.refresh_token, TokenKind::Refresh)
                .is_ok()
        );
        assert_eq!(pair.expires_in, 900);
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            access_token_expires_secs: -3600,
            ..JwtConfig::default()
        });
        let token = service.generate_access_token(7, "bot").unwrap();

        assert!(matches!(
            service.validate_token(&token, TokenKind::Access),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret() {
        let token = JwtService::new(JwtConfig {
            secret: "another-secret".to_string(),
            ..JwtConfig::default()
        })
        .generate_access_token(7, "bot")
        .unwrap();

        assert!(matches!(
            create_test_service().validate_token(&token, TokenKind::Access),
            Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        let result = service.validate_token("invalid.token.here", TokenKind::Access);
        assert!(result.is_err());
    }
}
