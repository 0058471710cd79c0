//! Upload HTTP Routes
//!
//! `POST /images` takes a multipart form with an `image` field and returns
//! the stored image's public URL.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::observability::{Event, Logger};

use super::response::{bad_request, reject, reject_upload, ApiResponse, ApiResult};
use super::state::AppState;

/// Multipart field carrying the file
pub const IMAGE_FIELD: &str = "image";

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadedImage {
    pub image_url: String,
}

/// Create upload routes
pub fn upload_routes(state: Arc<AppState>) -> Router {
    let body_limit = usize::try_from(state.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/images", post(upload_image_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn upload_image_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<UploadedImage>>)> {
    let actor = state.principal(&headers).map_err(reject)?;
    actor.require(Role::PostAdmin).map_err(reject)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;

        let image_url = state
            .images
            .store(&file_name, &data)
            .map_err(reject_upload)?;

        Logger::info(
            Event::ImageUploaded,
            &[
                ("actor", actor.name.clone()),
                ("bytes", data.len().to_string()),
                ("url", image_url.clone()),
            ],
        );

        return Ok((
            StatusCode::CREATED,
            ApiResponse::success(UploadedImage { image_url }, "Image uploaded successfully"),
        ));
    }

    Err(bad_request(format!("Missing '{}' file field", IMAGE_FIELD)))
}
