//! Password policy and hashing
//!
//! Every write path that touches a password goes through this module:
//! `validate_password` enforces the format rules, `hash_password` produces
//! the bcrypt digest that is stored, `verify_password` checks a candidate
//! against a stored digest. Plaintext never reaches the database.

use crate::error::AppError;

/// Characters allowed in passwords beyond alphanumerics. The
/// special-character class is satisfied from this pool.
pub const SPECIAL_CHARS: &str = "@$!%*?&.#~_-";

/// Minimum plaintext length before hashing
pub const MIN_PASSWORD_LEN: usize = 5;

/// Validate a candidate password against the account policy.
///
/// Rules, checked in a fixed order with the first failure reported:
/// minimum length, allowed character set, then one character from each
/// of the four classes (uppercase, lowercase, digit, special).
///
/// Example accepted passwords: `Password123!`, `passWord?123`,
/// `123pass-WORD`. Rejected: `password123` (no uppercase, no special),
/// `PASSWORD!123` (no lowercase).
pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if !password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || SPECIAL_CHARS.contains(c))
    {
        return Err(AppError::Validation(
            "password contains characters outside the allowed set".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::Validation(
            "password must contain an uppercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AppError::Validation(
            "password must contain a lowercase letter".to_string(),
        ));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation(
            "password must contain a digit".to_string(),
        ));
    }

    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(AppError::Validation(format!(
            "password must contain a special character ({})",
            SPECIAL_CHARS
        )));
    }

    Ok(())
}

/// Hash a password with bcrypt.
///
/// bcrypt is deliberately slow, so the work is moved off the async
/// runtime onto the blocking pool.
///
/// # Arguments
/// * `cost` - bcrypt cost factor (the account store runs at 10)
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Hashing(e.to_string()))?
        .map_err(|e| AppError::Hashing(e.to_string()))
}

/// Verify a candidate plaintext against a stored bcrypt digest.
///
/// A mismatch is `Ok(false)`; only an internal hashing failure
/// (e.g. a malformed stored digest) is an error.
pub async fn verify_password(candidate: &str, password_hash: &str) -> Result<bool, AppError> {
    let candidate = candidate.to_string();
    let password_hash = password_hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(candidate, &password_hash))
        .await
        .map_err(|e| AppError::Hashing(e.to_string()))?
        .map_err(|e| AppError::Hashing(e.to_string()))
}
