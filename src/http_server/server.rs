//! # HTTP Server
//!
//! Combines the item, upload and info routers into one axum app.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::catalog::ItemKind;
use crate::observability::{Event, Logger};

use super::config::HttpServerConfig;
use super::info_routes::{health_routes, info_routes};
use super::item_routes::item_routes;
use super::state::AppState;
use super::upload_routes::upload_routes;

/// Where each item kind is mounted
pub fn kind_path(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Brochure => "/api/v1/brochures",
        ItemKind::Service => "/api/v1/services",
    }
}

/// HTTP server for the catalog API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: Arc<AppState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Also serve uploaded files from `dir` at `prefix`
    pub fn with_static_dir(mut self, prefix: &str, dir: impl Into<PathBuf>) -> Self {
        let prefix = format!("/{}", prefix.trim_matches('/'));
        self.router = self.router.nest_service(&prefix, ServeDir::new(dir.into()));
        self
    }

    fn build_router(config: &HttpServerConfig, state: Arc<AppState>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let mut router = Router::new()
            .merge(health_routes())
            .nest("/api/v1", info_routes())
            .nest("/api/v1/uploads", upload_routes(state.clone()));

        for kind in ItemKind::ALL {
            router = router.nest(kind_path(kind), item_routes(state.clone(), kind));
        }

        router.layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{}", e)))?;

        let listener = TcpListener::bind(addr).await?;
        Logger::info(Event::ServerStarting, &[("addr", addr.to_string())]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;

        Logger::info(Event::ServerStopped, &[("addr", addr.to_string())]);
        Ok(())
    }
}
