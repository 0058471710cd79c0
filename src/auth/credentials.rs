//! # Credential Store
//!
//! Maps opaque tokens to roles. Tokens are kept only as SHA-256 digests and
//! every lookup compares against all stored digests in constant time.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::crypto::{constant_time_str_eq, hash_token};
use super::errors::{AuthError, AuthResult};
use super::role::{authorize, Principal, Role};

/// Actor name used when a credential carries no display name
pub const UNKNOWN_ACTOR: &str = "unknown";

/// What a token resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Branch the holder is restricted to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<u64>,
}

impl Credential {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            display_name: None,
            branch_id: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn in_branch(mut self, branch_id: u64) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    fn to_principal(&self) -> Principal {
        Principal {
            name: self
                .display_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_ACTOR.to_string()),
            role: self.role,
            branch_id: self.branch_id,
        }
    }
}

/// Credential store trait
///
/// Abstracts where token → credential mappings live.
pub trait CredentialStore: Send + Sync {
    /// Look up a raw token; `None` when unknown
    fn lookup(&self, token: &str) -> AuthResult<Option<Credential>>;
}

#[derive(Debug)]
struct StoredCredential {
    token_hash: String,
    credential: Credential,
}

/// In-memory credential store, populated from configuration
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    entries: RwLock<Vec<StoredCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token. Re-registering a token replaces its credential.
    pub fn insert(&self, token: &str, credential: Credential) -> AuthResult<()> {
        let token_hash = hash_token(token);
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        entries.retain(|e| !constant_time_str_eq(&e.token_hash, &token_hash));
        entries.push(StoredCredential {
            token_hash,
            credential,
        });
        Ok(())
    }

    pub fn with_token(self, token: &str, credential: Credential) -> AuthResult<Self> {
        self.insert(token, credential)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn lookup(&self, token: &str) -> AuthResult<Option<Credential>> {
        let token_hash = hash_token(token);
        let entries = self
            .entries
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        // Scan every entry so timing does not reveal the match position.
        let mut found = None;
        for entry in entries.iter() {
            if constant_time_str_eq(&entry.token_hash, &token_hash) {
                found = Some(entry.credential.clone());
            }
        }
        Ok(found)
    }
}

/// Resolves credentials to principals and compares roles
pub trait RoleAuthority: Send + Sync {
    /// Resolve a credential; absent or unknown credentials fail with `Unauthorized`
    fn resolve(&self, credential: Option<&str>) -> AuthResult<Principal>;

    /// Hierarchy comparison, independent of the backing store
    fn authorize(&self, role: Role, required: Role) -> bool {
        authorize(role, required)
    }
}

/// [`RoleAuthority`] backed by any [`CredentialStore`]
pub struct CredentialAuthority<S: CredentialStore> {
    store: S,
}

impl<S: CredentialStore> CredentialAuthority<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: CredentialStore> RoleAuthority for CredentialAuthority<S> {
    fn resolve(&self, credential: Option<&str>) -> AuthResult<Principal> {
        let token = match credential.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AuthError::Unauthorized),
        };

        self.store
            .lookup(token)?
            .map(|c| c.to_principal())
            .ok_or(AuthError::Unauthorized)
    }
}
