//! bcrypt hashing for user passwords. Failures here are server faults and
//! surface only as a generic 500; a wrong password is `Ok(false)`, never an
//! error.

use crate::error::AppError;
use bcrypt::{hash, verify};

/// Work factor for newly stored hashes. bcrypt embeds the cost in the hash
/// itself, so changing this leaves verification of existing rows intact.
const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}
