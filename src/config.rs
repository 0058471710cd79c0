//! # Configuration
//!
//! One JSON file drives the whole service. Every field has a default, so
//! `{}` is a valid (if credential-less) configuration.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{AuthResult, Credential, InMemoryCredentialStore, Role};
use crate::catalog::{CodeTags, ItemKind, LifecycleConfig};
use crate::http_server::HttpServerConfig;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// One accepted admin token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    pub token: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<u64>,
}

impl CredentialEntry {
    fn to_credential(&self) -> Credential {
        let mut credential = Credential::new(self.role);
        if let Some(name) = &self.display_name {
            credential = credential.named(name.clone());
        }
        if let Some(branch) = self.branch_id {
            credential = credential.in_branch(branch);
        }
        credential
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: HttpServerConfig,

    #[serde(default)]
    pub credentials: Vec<CredentialEntry>,

    /// Branch a super admin's create falls back to; absent = global
    #[serde(default)]
    pub default_branch_id: Option<u64>,

    #[serde(default)]
    pub default_contact_phone: Option<String>,

    #[serde(default)]
    pub code_tags: CodeTags,

    /// JSON-lines audit file; absent = in-memory audit log
    #[serde(default)]
    pub audit_log_path: Option<PathBuf>,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    #[serde(default = "default_public_upload_prefix")]
    pub public_upload_prefix: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// JSON snapshot of all items; absent = in-memory store
    #[serde(default)]
    pub data_file: Option<PathBuf>,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("static/brochures")
}

fn default_public_upload_prefix() -> String {
    "/static/brochures".to_string()
}

fn default_max_upload_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            credentials: Vec::new(),
            default_branch_id: None,
            default_contact_phone: None,
            code_tags: CodeTags::default(),
            audit_log_path: None,
            upload_dir: default_upload_dir(),
            public_upload_prefix: default_public_upload_prefix(),
            max_upload_bytes: default_max_upload_bytes(),
            data_file: None,
        }
    }
}

impl AppConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port must be > 0"));
        }

        let mut seen = HashSet::new();
        for (i, entry) in self.credentials.iter().enumerate() {
            let token = entry.token.trim();
            if token.is_empty() {
                return Err(ConfigError::invalid(format!(
                    "credentials[{}].token must not be blank",
                    i
                )));
            }
            if !seen.insert(token) {
                return Err(ConfigError::invalid(format!(
                    "credentials[{}].token is a duplicate",
                    i
                )));
            }
        }

        for kind in ItemKind::ALL {
            let tag = self.code_tags.for_kind(kind);
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConfigError::invalid(format!(
                    "code_tags.{} must be non-empty and alphanumeric, got '{}'",
                    kind, tag
                )));
            }
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::invalid("max_upload_bytes must be > 0"));
        }

        Ok(())
    }

    /// Credential store holding every configured token
    pub fn credential_store(&self) -> AuthResult<InMemoryCredentialStore> {
        let store = InMemoryCredentialStore::new();
        for entry in &self.credentials {
            store.insert(entry.token.trim(), entry.to_credential())?;
        }
        Ok(store)
    }

    pub fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            default_branch_id: self.default_branch_id,
            default_contact_phone: self.default_contact_phone.clone(),
            code_tags: self.code_tags.clone(),
        }
    }

    /// Development configuration written by `giyo init`
    pub fn sample() -> Self {
        let entry = |token: &str, role: Role, name: &str, branch_id: Option<u64>| CredentialEntry {
            token: token.to_string(),
            role,
            display_name: Some(name.to_string()),
            branch_id,
        };

        Self {
            credentials: vec![
                entry("ABC123", Role::SuperAdmin, "Super Admin", None),
                entry("DEF456", Role::PostAdmin, "Branch Admin", Some(1)),
                entry("VIEW789", Role::Viewer, "Viewer", None),
            ],
            default_branch_id: Some(1),
            default_contact_phone: Some("96512345678".to_string()),
            audit_log_path: Some(PathBuf::from("data/audit.log")),
            data_file: Some(PathBuf::from("data/items.json")),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialStore;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.code_tags.for_kind(ItemKind::Service), "SRV");
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.upload_dir, PathBuf::from("static/brochures"));
    }

    #[test]
    fn test_validation_failures() {
        let cases = [
            r#"{"server":{"port":0}}"#,
            r#"{"credentials":[{"token":"  ","role":"viewer"}]}"#,
            r#"{"credentials":[{"token":"A","role":"viewer"},{"token":"A","role":"super_admin"}]}"#,
            r#"{"code_tags":{"brochure":"B-N"}}"#,
            r#"{"code_tags":{"service":""}}"#,
            r#"{"max_upload_bytes":0}"#,
        ];
        for json in cases {
            assert!(
                matches!(AppConfig::from_json(json), Err(ConfigError::Invalid(_))),
                "{}",
                json
            );
        }
    }

    #[test]
    fn test_unknown_role_is_parse_error() {
        let json = r#"{"credentials":[{"token":"A","role":"root"}]}"#;
        assert!(matches!(AppConfig::from_json(json), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_credential_store_from_config() {
        let store = AppConfig::sample().credential_store().unwrap();
        assert_eq!(store.len(), 3);

        let branch_admin = store.lookup("DEF456").unwrap().unwrap();
        assert_eq!(branch_admin.role, Role::PostAdmin);
        assert_eq!(branch_admin.branch_id, Some(1));
        assert!(store.lookup("nope").unwrap().is_none());
    }

    #[test]
    fn test_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("giyo.json");
        fs::write(&path, serde_json::to_string_pretty(&AppConfig::sample()).unwrap()).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, AppConfig::sample());

        assert!(matches!(
            AppConfig::load(&temp.path().join("missing.json")),
            Err(ConfigError::Read { .. })
        ));
    }
}
