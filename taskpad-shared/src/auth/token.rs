/// Opaque bearer token utilities
///
/// Tokens handed to clients look like `tp_` followed by 40 random
/// alphanumeric characters. Only the SHA-256 digest is persisted, so a
/// database leak does not expose usable credentials.
///
/// # Example
///
/// ```
/// use taskpad_shared::auth::token::{generate_token, hash_token, validate_token_format};
///
/// let (token, hash) = generate_token();
/// assert!(validate_token_format(&token));
/// assert_eq!(hash_token(&token), hash);
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Prefix identifying Taskpad tokens
const TOKEN_PREFIX: &str = "tp_";

/// Random characters after the prefix
const TOKEN_RANDOM_LENGTH: usize = 40;

/// Total length of a well-formed token
pub const TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a fresh token
///
/// Returns `(plaintext, sha256_hex)`. The plaintext is shown to the client
/// once; only the hash is stored.
pub fn generate_token() -> (String, String) {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    let random: String = (0..TOKEN_RANDOM_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    let token = format!("{}{}", TOKEN_PREFIX, random);
    let hash = hash_token(&token);

    (token, hash)
}

/// SHA-256 hex digest of a plaintext token
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cheap structural check done before touching the database
pub fn validate_token_format(token: &str) -> bool {
    token.len() == TOKEN_LENGTH
        && token
            .strip_prefix(TOKEN_PREFIX)
            .is_some_and(|random| random.chars().all(|c| c.is_ascii_alphanumeric()))
}
