/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/register` - Register new user
/// - `POST /api/login` - Exchange credentials for a bearer token
/// - `POST /api/logout` - Revoke the token used for the request

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, UNAUTHENTICATED},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskpad_shared::{
    auth::{middleware::AuthContext, nickname::derive_unique_nickname, password},
    models::{
        access_token::{AccessToken, LOGIN_TOKEN_NAME},
        user::{CreateUser, User},
    },
};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Text columns cannot store NUL, so it is rejected before any query
fn no_nul_characters(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::new("nul_character")
            .with_message(Cow::Borrowed("The field must not contain NUL characters.")));
    }
    Ok(())
}

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 255, message = "The first name field is required and must not exceed 255 characters."),
        custom(function = "no_nul_characters")
    )]
    pub first_name: String,

    #[serde(default)]
    #[validate(
        length(min = 1, max = 255, message = "The last name field is required and must not exceed 255 characters."),
        custom(function = "no_nul_characters")
    )]
    pub last_name: String,

    #[serde(default)]
    #[validate(
        email(message = "The email field must be a valid email address."),
        length(max = 255, message = "The email field must not exceed 255 characters."),
        custom(function = "no_nul_characters")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "The password field must be at least 8 characters."))]
    pub password: String,

    #[serde(default)]
    #[validate(must_match(other = "password", message = "The password confirmation does not match."))]
    pub password_confirmation: String,
}

impl RegisterRequest {
    /// Trims names and email and lower-cases the email
    fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            ..self
        }
    }
}

/// Message-only response body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "The email field is required."),
        custom(function = "no_nul_characters")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Plaintext bearer token; shown only here
    pub token: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/register
/// Content-Type: application/json
///
/// {
///   "first_name": "Ada",
///   "last_name": "Lovelace",
///   "email": "ada@example.com",
///   "password": "analytical",
///   "password_confirmation": "analytical"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{"message": "User registered successfully"}`. The
/// user is not logged in.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed or email already taken
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(req) = payload?;
    let req = req.normalized();
    req.validate()?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::invalid_field("email", "The email has already been taken."));
    }

    let nickname = derive_unique_nickname(&state.db, &req.first_name, &req.last_name).await?;
    let password_hash = password::hash_password_blocking(req.password).await?;

    // Unique violations from a concurrent registration map to 422 via From<sqlx::Error>
    let user = User::create(
        &state.db,
        CreateUser {
            nickname,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, nickname = %user.nickname, "User registered");

    Ok((StatusCode::CREATED, MessageResponse::new("User registered successfully")))
}

/// Login endpoint
///
/// Issues a new bearer token. Tokens from earlier logins stay valid.
///
/// # Endpoint
///
/// ```text
/// POST /api/login
/// Content-Type: application/json
///
/// { "email": "ada@example.com", "password": "analytical" }
/// ```
///
/// # Response
///
/// ```json
/// { "token": "tp_..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (same message for both)
/// - `422 Unprocessable Entity`: Missing fields
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let email = req.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let valid = password::verify_password_blocking(req.password, user.password_hash).await?;
    if !valid {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let (token, plaintext) = AccessToken::issue(&state.db, user.id, LOGIN_TOKEN_NAME).await?;
    tracing::info!(user_id = %user.id, token_id = %token.id, "Issued access token");

    Ok(Json(LoginResponse { token: plaintext }))
}

/// Logout endpoint
///
/// Revokes only the token that authenticated this request.
///
/// # Endpoint
///
/// ```text
/// POST /api/logout
/// Authorization: Bearer tp_...
/// ```
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MessageResponse>> {
    let revoked = AccessToken::revoke(&state.db, auth.token_id, auth.user_id).await?;
    if !revoked {
        // Raced with another logout using the same token
        return Err(ApiError::Unauthorized(UNAUTHENTICATED.to_string()));
    }

    tracing::info!(user_id = %auth.user_id, token_id = %auth.token_id, "Access token revoked");

    Ok(MessageResponse::new("Logged out"))
}
