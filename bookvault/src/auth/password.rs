//! Argon2id password hashing with a server-side pepper.

use super::errors::{AuthError, AuthResult};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a password with Argon2id. The pepper is appended before hashing so a
/// leaked database alone is not enough to attack the hashes offline.
pub fn hash_password(password: &str, pepper: &str) -> AuthResult<String> {
    let peppered = format!("{password}{pepper}");
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(peppered.as_bytes(), &salt)
        .map_err(|_| AuthError::HashingFailed)?
        .to_string())
}

/// Verify a password against a stored hash. Failure is reported as
/// `InvalidCredentials` so callers cannot distinguish a malformed hash from a
/// wrong password.
pub fn verify_password(password: &str, pepper: &str, hash: &str) -> AuthResult<()> {
    let peppered = format!("{password}{pepper}");
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(peppered.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
