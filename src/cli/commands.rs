//! CLI command implementations
//!
//! `serve` boots in a fixed order: load config, open the item store, open
//! the audit log, build the credential store, assemble the lifecycle and
//! HTTP state, then serve.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::auth::CredentialAuthority;
use crate::catalog::{
    FileItemRepository, InMemoryItemRepository, ItemRepository, MarketingItemLifecycle,
    SystemClock,
};
use crate::config::AppConfig;
use crate::http_server::{AppState, HttpServer};
use crate::observability::{AuditLog, AuditRecorder, Event, FileAuditLog, Logger, MemoryAuditLog};
use crate::uploads::LocalImageStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::CheckConfig { config } => check_config(&config),
        Command::Serve { config, port } => serve(&config, port),
    }
}

/// Write a development configuration; refuses to overwrite
pub fn init(config_path: &Path) -> CliResult<()> {
    if config_path.exists() {
        return Err(CliError::config_error(format!(
            "Config file already exists: {}",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                CliError::io_error(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }
    }

    let config = AppConfig::sample();
    fs::write(config_path, serde_json::to_string_pretty(&config)?)?;

    write_response(json!({
        "initialized": true,
        "config": config_path.display().to_string(),
    }))
}

/// Load + validate, then print a summary
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    write_response(summary(&config))
}

fn summary(config: &AppConfig) -> serde_json::Value {
    json!({
        "valid": true,
        "listen": config.server.socket_addr(),
        "credentials": config.credentials.len(),
        "storage": if config.data_file.is_some() { "file" } else { "memory" },
        "audit": if config.audit_log_path.is_some() { "file" } else { "memory" },
        "code_tags": config.code_tags,
    })
}

/// Build the full service graph from a validated config
pub fn build_state(config: &AppConfig) -> CliResult<AppState> {
    let repo: Arc<dyn ItemRepository> = match &config.data_file {
        Some(path) => Arc::new(FileItemRepository::open(path).map_err(|e| {
            CliError::boot_failed(format!("Failed to open item store: {}", e))
        })?),
        None => Arc::new(InMemoryItemRepository::new()),
    };

    let audit_log: Arc<dyn AuditLog> = match &config.audit_log_path {
        Some(path) => Arc::new(FileAuditLog::open(path).map_err(|e| {
            CliError::boot_failed(format!("Failed to open audit log {:?}: {}", path, e))
        })?),
        None => Arc::new(MemoryAuditLog::new()),
    };

    let authority = Arc::new(CredentialAuthority::new(config.credential_store()?));
    let images = Arc::new(LocalImageStore::new(
        &config.upload_dir,
        config.public_upload_prefix.clone(),
        config.max_upload_bytes,
    ));

    let lifecycle = MarketingItemLifecycle::new(
        repo,
        AuditRecorder::new(audit_log),
        Arc::new(SystemClock),
        config.lifecycle_config(),
    );

    Ok(AppState::new(lifecycle, authority, images).with_max_upload_bytes(config.max_upload_bytes))
}

/// Run the HTTP API until interrupted
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = AppConfig::load(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
        config.validate()?;
    }

    Logger::info(
        Event::ConfigLoaded,
        &[
            ("credentials", config.credentials.len().to_string()),
            ("path", config_path.display().to_string()),
        ],
    );

    let state = Arc::new(build_state(&config)?);
    let server = HttpServer::new(config.server.clone(), state)
        .with_static_dir(&config.public_upload_prefix, &config.upload_dir);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CreateItem, ItemKind};
    use crate::auth::{Principal, Role};
    use tempfile::TempDir;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("conf").join("giyo.json");

        init(&path).unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::sample());

        let err = init(&path).unwrap_err();
        assert_eq!(err.code_str(), "GIYO_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_check_config_reports_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("giyo.json");
        fs::write(&path, r#"{"max_upload_bytes":0}"#).unwrap();

        let err = check_config(&path).unwrap_err();
        assert_eq!(err.code_str(), "GIYO_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_summary_fields() {
        let value = summary(&AppConfig::sample());
        assert_eq!(value["credentials"], 3);
        assert_eq!(value["storage"], "file");
        assert_eq!(value["code_tags"]["brochure"], "BUN");
    }

    #[test]
    fn test_build_state_with_file_backends() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            data_file: Some(temp.path().join("data").join("items.json")),
            audit_log_path: Some(temp.path().join("data").join("audit.log")),
            upload_dir: temp.path().join("uploads"),
            ..AppConfig::sample()
        };

        let state = build_state(&config).unwrap();
        let owner = Principal::new("Owner", Role::SuperAdmin);
        state
            .lifecycle
            .create(ItemKind::Brochure, &owner, CreateItem::new("Offer", "skin"))
            .unwrap();

        assert!(temp.path().join("data").join("items.json").exists());
        let audit = fs::read_to_string(temp.path().join("data").join("audit.log")).unwrap();
        assert_eq!(audit.lines().count(), 1);
    }
}
