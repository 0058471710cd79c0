//! # Giyo Auth Module
//!
//! Role resolution and authorization for catalog mutations.
//!
//! Credentials are opaque tokens. A [`CredentialStore`] maps a token to a
//! [`Credential`]; a [`RoleAuthority`] turns that into a request-scoped
//! [`Principal`] and answers hierarchy comparisons.

pub mod errors;
pub mod crypto;
pub mod role;
pub mod credentials;

pub use errors::{AuthError, AuthResult};
pub use role::{authorize, Principal, Role};
pub use credentials::{
    Credential, CredentialAuthority, CredentialStore, InMemoryCredentialStore, RoleAuthority,
    UNKNOWN_ACTOR,
};
