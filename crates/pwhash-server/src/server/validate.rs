//! Request validation.
//!
//! Validation runs before anything reaches the core, so a rejected request
//! never allocates an identifier or registers work.

use crate::server::error::ApiError;
use pwhash::Identifier;

pub const PASSWORD_FIELD: &str = "Password";
pub const PASSWORD_MESSAGE: &str = "Please enter a valid password";
pub const ID_FIELD: &str = "Id";
pub const ID_MESSAGE: &str = "Please enter a valid password id";

/// Rejects secrets that are empty once surrounding whitespace is trimmed.
///
/// The secret itself is passed on untrimmed.
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.trim().is_empty() {
        return Err(ApiError::field(PASSWORD_FIELD, PASSWORD_MESSAGE));
    }
    Ok(())
}

/// Parses an identifier taken from a path segment.
pub fn parse_id(raw: &str) -> Result<Identifier, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::field(ID_FIELD, ID_MESSAGE))
}
