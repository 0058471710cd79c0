//! Shared handler state and caller identification

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::auth::{Principal, RoleAuthority, UNKNOWN_ACTOR};
use crate::catalog::{CatalogError, CatalogResult, MarketingItemLifecycle};
use crate::uploads::ImageStore;

/// Credential header
pub const TOKEN_HEADER: &str = "x-admin-token";
/// Actor display name, used when the credential carries none
pub const NAME_HEADER: &str = "x-admin-name";
/// Branch for branch-scoped callers whose credential carries none
pub const BRANCH_HEADER: &str = "x-admin-branch";

/// Default cap on uploaded image size
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Service graph shared by every handler
pub struct AppState {
    pub lifecycle: MarketingItemLifecycle,
    pub authority: Arc<dyn RoleAuthority>,
    pub images: Arc<dyn ImageStore>,
    /// Request body cap on the upload route
    pub max_upload_bytes: u64,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl AppState {
    pub fn new(
        lifecycle: MarketingItemLifecycle,
        authority: Arc<dyn RoleAuthority>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            lifecycle,
            authority,
            images,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Resolve the caller; a missing or unknown token is `Unauthorized`
    pub fn principal(&self, headers: &HeaderMap) -> CatalogResult<Principal> {
        let mut principal = self.authority.resolve(header(headers, TOKEN_HEADER))?;

        if principal.name == UNKNOWN_ACTOR {
            if let Some(name) = header(headers, NAME_HEADER) {
                principal.name = name.to_string();
            }
        }

        if principal.role.is_branch_scoped() && principal.branch_id.is_none() {
            if let Some(raw) = header(headers, BRANCH_HEADER) {
                let branch: u64 = raw
                    .parse()
                    .map_err(|_| CatalogError::validation("Invalid branch ID header"))?;
                principal.branch_id = Some(branch);
            }
        }
        Ok(principal)
    }

    /// Like [`principal`](Self::principal), but no token at all means an
    /// anonymous caller
    pub fn optional_principal(&self, headers: &HeaderMap) -> CatalogResult<Option<Principal>> {
        match header(headers, TOKEN_HEADER) {
            None => Ok(None),
            Some(_) => self.principal(headers).map(Some),
        }
    }
}
