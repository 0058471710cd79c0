//! # Catalog Errors
//!
//! The error taxonomy every catalog operation reports through.

use std::fmt;

use thiserror::Error;

use crate::auth::AuthError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Catalog operation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Malformed, missing or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// Credential absent or unknown
    #[error("Authentication required")]
    Unauthorized,

    /// Role below the operation's minimum
    #[error("{0}")]
    Forbidden(String),

    /// Target absent, out of scope, or in the wrong state for the transition
    #[error("{0}")]
    NotFound(String),

    /// Code or slug already taken
    #[error("{0}")]
    Conflict(String),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthorized => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Storage(_) => 500,
        }
    }

    /// Stable machine-readable error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// 4xx errors are the caller's to fix
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<AuthError> for CatalogError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => Self::Unauthorized,
            AuthError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            AuthError::StorageError(msg) => Self::Storage(msg),
        }
    }
}

/// Columns the storage layer keeps unique per item kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Code,
    Slug,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Code => write!(f, "code"),
            UniqueField::Slug => write!(f, "slug"),
        }
    }
}

/// Errors surfaced by an item repository
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// Unique constraint violation
    #[error("{field} '{value}' already exists")]
    Conflict { field: UniqueField, value: String },

    #[error("item {0} not found")]
    NotFound(u64),

    /// The row changed between read and write
    #[error("item {0} was modified concurrently; reload and retry")]
    Stale(u64),

    #[error("{0}")]
    Backend(String),
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { .. } | RepositoryError::Stale(_) => {
                Self::Conflict(err.to_string())
            }
            RepositoryError::NotFound(_) => Self::NotFound(err.to_string()),
            RepositoryError::Backend(msg) => Self::Storage(msg),
        }
    }
}
