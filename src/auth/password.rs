//! Argon2id password hashes for the embedded directory.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand_core::OsRng;
use thiserror::Error;

/// Minimum length accepted by `hash-password`.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    TooLong,

    #[error("password hashing failed: {0}")]
    HashError(String),

    #[error("invalid password hash format")]
    InvalidHash,

    #[error("password verification failed")]
    VerificationFailed,
}

/// Argon2id with 64 MiB memory, 3 iterations and 4 lanes.
fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(65536, 3, 4, None)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password into a PHC string.
///
/// ```
/// let hash = s3nav::auth::hash_password("correct horse").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    validate_password(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a PHC string. Parameters come from the hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// Length checks applied before hashing.
pub fn validate_password(password: &str) -> Result<(), PasswordError> {
    let length = password.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(PasswordError::TooLong);
    }
    Ok(())
}
