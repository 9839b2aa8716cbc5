/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers should return `Result<T, ApiError>` which automatically
/// converts to appropriate HTTP status codes.
///
/// Every error body has the same shape:
///
/// ```json
/// { "error": "validation_error", "message": "...", "details": [{"field": "...", "message": "..."}] }
/// ```
///
/// # Example
///
/// ```
/// use taskpad_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(found: bool) -> ApiResult<Json<serde_json::Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Task not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskpad_shared::{
    auth::{middleware::AuthError, password::PasswordError},
    generation::GenerationFailure,
    models::user::{EMAIL_CONSTRAINT, NICKNAME_CONSTRAINT},
};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404), also used for other users' resources
    NotFound(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// AI task generation failed (500); the message is shown to the client
    GenerationFailed(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// A 422 for a single field
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(field, message)])
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::GenerationFailed(msg) => write!(f, "Generation failed: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "Request validation failed".to_string()),
                Some(errors),
            ),
            // Already logged with topic and raw response by the generator
            ApiError::GenerationFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "generation_failed",
                msg,
                None,
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique violations on the user table are a registration race and are
/// reported against the conflicting field.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                match db_err.constraint() {
                    Some(EMAIL_CONSTRAINT) => {
                        ApiError::invalid_field("email", "The email has already been taken.")
                    }
                    Some(NICKNAME_CONSTRAINT) => ApiError::invalid_field(
                        "nickname",
                        "Could not assign a unique nickname, please retry.",
                    ),
                    _ => ApiError::InternalError(format!("Database error: {}", db_err)),
                }
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Body message of every `401` for a missing, malformed, unknown or revoked token
pub const UNAUTHENTICATED: &str = "Unauthenticated.";

/// Convert auth errors to API errors
///
/// Clients see one message for every credential problem; the reason is only logged.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DatabaseError(msg) => ApiError::InternalError(msg),
            other => {
                tracing::debug!(reason = %other, "Rejected bearer credentials");
                ApiError::Unauthorized(UNAUTHENTICATED.to_string())
            }
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<GenerationFailure> for ApiError {
    fn from(err: GenerationFailure) -> Self {
        ApiError::GenerationFailed(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut errors: Vec<ValidationErrorDetail> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("The {} field is invalid.", field)),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(errors)
    }
}

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// Best-effort field name for a body that parsed as JSON but had the wrong shape
fn rejected_field(body_text: &str) -> (String, String) {
    let detail = body_text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(body_text);

    if let Some((path, message)) = detail.split_once(": ") {
        if !path.is_empty() && !path.contains(char::is_whitespace) {
            return (path.to_string(), message.to_string());
        }
    }

    if let Some(rest) = detail.strip_prefix("missing field `") {
        if let Some((field, _)) = rest.split_once('`') {
            return (field.to_string(), format!("The {} field is required.", field));
        }
    }

    ("body".to_string(), detail.to_string())
}

/// An unparseable query string is a plain 400 with the usual error body
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Body rejections: wrong types are validation errors, unreadable bodies are 400
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                let (field, message) = rejected_field(&err.body_text());
                ApiError::invalid_field(&field, message)
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail::new("email", "Invalid email format"),
            ValidationErrorDetail::new("password", "Password too short"),
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[tokio::test]
    async fn test_status_codes_and_bodies() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "bad_request"),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "unauthorized"),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND, "not_found"),
            (
                ApiError::invalid_field("title", "x"),
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
            ),
            (
                ApiError::GenerationFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "generation_failed",
            ),
        ];

        for (err, status, code) in cases {
            let response = err.into_response();
            assert_eq!(response.status(), status);
            assert_eq!(body_json(response).await["error"], code);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::InternalError("connection refused".into()).into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_validation_body_lists_details() {
        let response = ApiError::invalid_field("title", "The title field is required.").into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "The title field is required.");
        assert_eq!(body["details"][0]["field"], "title");
    }

    #[test]
    fn test_generation_failure_keeps_message() {
        let failure = GenerationFailure {
            topic: "garden".to_string(),
            source: taskpad_shared::generation::GenerationError::NotAnArray,
        };
        match ApiError::from(failure) {
            ApiError::GenerationFailed(msg) => {
                assert!(msg.starts_with("Failed to generate tasks for topic 'garden': "))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_auth_errors_share_one_message() {
        for err in [
            AuthError::MissingCredentials,
            AuthError::InvalidFormat("Expected Bearer token".into()),
            AuthError::InvalidToken("Invalid or revoked token".into()),
        ] {
            match ApiError::from(err) {
                ApiError::Unauthorized(msg) => assert_eq!(msg, UNAUTHENTICATED),
                other => panic!("unexpected: {other:?}"),
            }
        }
        assert!(matches!(
            ApiError::from(AuthError::DatabaseError("x".into())),
            ApiError::InternalError(_)
        ));
    }

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 8, message = "Too short"))]
        password: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_from_validation_errors() {
        let sample = Sample {
            password: "short".to_string(),
            email: "nope".to_string(),
        };

        match ApiError::from(sample.validate().unwrap_err()) {
            ApiError::ValidationError(details) => {
                assert_eq!(
                    details,
                    vec![
                        ValidationErrorDetail::new("email", "The email field is invalid."),
                        ValidationErrorDetail::new("password", "Too short"),
                    ]
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_query_rejection_is_bad_request() {
        let uri: axum::http::Uri = "/api/tasks?page=two".parse().unwrap();
        let rejection = axum::extract::Query::<std::collections::HashMap<String, u32>>::try_from_uri(&uri)
            .unwrap_err();

        assert!(matches!(ApiError::from(rejection), ApiError::BadRequest(_)));
    }

    #[test]
    fn test_rejected_field() {
        assert_eq!(
            rejected_field(
                "Failed to deserialize the JSON body into the target type: description: invalid type: map, expected a string at line 1 column 16"
            ),
            (
                "description".to_string(),
                "invalid type: map, expected a string at line 1 column 16".to_string()
            )
        );
        assert_eq!(
            rejected_field(
                "Failed to deserialize the JSON body into the target type: missing field `title` at line 1 column 2"
            )
            .0,
            "title"
        );
        assert_eq!(
            rejected_field("Failed to deserialize the JSON body into the target type: invalid type: integer `1`, expected a map")
                .0,
            "body"
        );
    }
}
