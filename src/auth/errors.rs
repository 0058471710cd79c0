//! # Auth Errors
//!
//! Error types for the authentication module.

use thiserror::Error;

use super::role::Role;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Credential missing or unknown
    #[error("Authentication required")]
    Unauthorized,

    /// Credential is valid but its role is below the requirement
    #[error("Insufficient permissions: requires {required}, caller is {actual}")]
    Forbidden { required: Role, actual: Role },

    /// Credential backend failed
    #[error("Credential store error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Unauthorized => 401,
            AuthError::Forbidden { .. } => 403,
            AuthError::StorageError(_) => 500,
        }
    }
}
