/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: Opaque bearer token generation and hashing
/// - [`nickname`]: `first.last[N]` nickname derivation
/// - [`middleware`]: Resolving a request's bearer token to an [`middleware::AuthContext`]
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::auth::password::{hash_password, verify_password};
/// use taskpad_shared::models::access_token::AccessToken;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (_row, plaintext) = AccessToken::issue(&pool, user_id, "api").await?;
/// println!("Bearer {}", plaintext);
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod nickname;
pub mod password;
pub mod token;
