use bcrypt::{BcryptError, DEFAULT_COST};
use tracing::warn;

/// Shortest password accepted on create/update
pub const MIN_PASSWORD_LEN: usize = 6;

/// Hash a password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(password, cost)
}

/// Check a password against a stored bcrypt hash.
///
/// A stored value that is not a bcrypt hash never matches.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match bcrypt::verify(password, stored) {
        Ok(valid) => valid,
        Err(e) => {
            warn!(error = %e, "Stored password hash is unreadable");
            false
        }
    }
}
