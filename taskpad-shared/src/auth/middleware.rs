/// Bearer token authentication
///
/// Resolves the `Authorization: Bearer <token>` header of a request into an
/// [`AuthContext`]: the authenticated principal that route handlers receive
/// through request extensions and pass explicitly into every model call.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskpad_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::token::validate_token_format;
use crate::models::access_token::AccessToken;

/// The authenticated principal of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// User the bearer token belongs to
    pub user_id: Uuid,

    /// Row id of the token that authenticated this request (used by logout)
    pub token_id: Uuid,
}

impl AuthContext {
    pub fn from_token(token: &AccessToken) -> Self {
        Self {
            user_id: token.user_id,
            token_id: token.id,
        }
    }
}

/// Why a request could not be authenticated
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("{0}")]
    InvalidFormat(String),

    /// Token unknown or revoked
    #[error("{0}")]
    InvalidToken(String),

    /// Token lookup failed
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Extracts the raw token from an `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Authenticates a request from its headers
///
/// Malformed tokens are rejected without a database round trip.
pub async fn authenticate_bearer(pool: &PgPool, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    if !validate_token_format(token) {
        return Err(AuthError::InvalidToken("Invalid token".to_string()));
    }

    let access_token = AccessToken::resolve(pool, token)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AuthError::InvalidToken("Invalid or revoked token".to_string()))?;

    Ok(AuthContext::from_token(&access_token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with("Bearer tp_abc");
        assert_eq!(bearer_token(&headers).unwrap(), "tp_abc");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_wrong_scheme() {
        assert!(matches!(
            bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidFormat(_))
        ));
        assert!(matches!(
            bearer_token(&headers_with("Bearer ")),
            Err(AuthError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_auth_context_from_token() {
        let token = AccessToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "api".to_string(),
            token_hash: "0".repeat(64),
            created_at: chrono::Utc::now(),
            last_used_at: None,
        };

        let context = AuthContext::from_token(&token);
        assert_eq!(context.user_id, token.user_id);
        assert_eq!(context.token_id, token.id);
    }
}
