/// Nickname derivation
///
/// A user's nickname is `first.last` lower-cased. When that is taken the
/// first free name in `first.last1`, `first.last2`, ... is used. Each
/// candidate is probed in turn; the probe is not isolated from concurrent
/// registrations, so the unique constraint on `users.nickname` remains the
/// final arbiter.

use sqlx::PgPool;
use std::future::Future;

use crate::models::user::User;

/// `first.last`, lower-cased, with no other normalization
pub fn base_nickname(first_name: &str, last_name: &str) -> String {
    format!("{}.{}", first_name, last_name).to_lowercase()
}

/// The `attempt`-th candidate: the base itself, then base + 1, base + 2, ...
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{}{}", base, attempt)
    }
}

/// Returns the first candidate for which `is_taken` reports `false`
pub async fn first_available<F, Fut, E>(base: &str, mut is_taken: F) -> Result<String, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut attempt = 0;
    loop {
        let nickname = candidate(base, attempt);
        if !is_taken(nickname.clone()).await? {
            return Ok(nickname);
        }
        attempt += 1;
    }
}

/// Derives a nickname not currently present in the `users` table
pub async fn derive_unique_nickname(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
) -> Result<String, sqlx::Error> {
    let base = base_nickname(first_name, last_name);
    let nickname = first_available(&base, move |name| async move {
        User::nickname_exists(pool, &name).await
    })
    .await?;

    tracing::debug!(nickname = %nickname, "Derived nickname");
    Ok(nickname)
}
