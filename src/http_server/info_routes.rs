//! Health and info HTTP Routes

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use super::response::ApiResponse;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiInfo {
    pub routes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Welcome {
    pub message: String,
}

/// Routes listed by `/api/v1/info`
pub const API_ROUTES: [&str; 4] = [
    "/api/v1/brochures",
    "/api/v1/services",
    "/api/v1/uploads/images",
    "/api/v1/info",
];

/// Root-level routes: `/` and `/health`
pub fn health_routes() -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}

/// Versioned info route, mounted under `/api/v1`
pub fn info_routes() -> Router {
    Router::new().route("/info", get(info_handler))
}

async fn root_handler() -> Json<Welcome> {
    Json(Welcome {
        message: "Welcome to Giyo Backend API. Use /api/v1/ for endpoints.".to_string(),
    })
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

async fn info_handler() -> Json<ApiResponse<ApiInfo>> {
    ApiResponse::success(
        ApiInfo {
            routes: API_ROUTES.iter().map(|r| r.to_string()).collect(),
        },
        format!("Giyo API v{} is operational.", env!("CARGO_PKG_VERSION")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
    }
}
