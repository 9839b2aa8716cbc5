/// Bearer token authentication layer
///
/// Resolves the request's bearer token and injects the resulting
/// [`AuthContext`] into request extensions. Requests without a valid token
/// never reach the handler.
///
/// # Example
///
/// ```no_run
/// use axum::{routing::get, Extension, Router};
/// use taskpad_api::{app::AppState, middleware::auth::require_auth};
/// use taskpad_shared::auth::middleware::AuthContext;
///
/// async fn me(Extension(auth): Extension<AuthContext>) -> String {
///     auth.user_id.to_string()
/// }
///
/// fn routes(state: AppState) -> Router<AppState> {
///     Router::new()
///         .route("/me", get(me))
///         .layer(axum::middleware::from_fn_with_state(state, require_auth))
/// }
/// ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use taskpad_shared::auth::middleware::authenticate_bearer;

use crate::{app::AppState, error::ApiError};

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate_bearer(&state.db, req.headers()).await.map_err(|e| {
        tracing::debug!(error = %e, "Rejected request authentication");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
