//! bcrypt password hashing.

use crate::error::{AppError, AppResult};

/// Hash a plaintext password with the library default cost.
pub fn hash_password(plain: &str) -> AppResult<String> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a plaintext password against a stored hash.
///
/// A malformed stored hash counts as a mismatch.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    bcrypt::verify(plain, hashed).unwrap_or(false)
}
