//! # Giyo HTTP Server Module
//!
//! JSON API over the catalog lifecycle.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/info` - Route listing
//! - `/api/v1/brochures/*`, `/api/v1/services/*` - Item lifecycle
//! - `/api/v1/uploads/images` - Image upload

pub mod config;
pub mod info_routes;
pub mod item_routes;
pub mod response;
pub mod server;
pub mod state;
pub mod upload_routes;

pub use config::HttpServerConfig;
pub use response::{ApiResponse, ErrorResponse, Page};
pub use server::{kind_path, HttpServer};
pub use state::{AppState, BRANCH_HEADER, NAME_HEADER, TOKEN_HEADER};
