//! Response envelopes and error mapping
//!
//! Success: `{status: "success", data, message}`.
//! Error: `{status: "error", message, code}` with the HTTP status taken from
//! the error itself.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::observability::{Event, Logger};
use crate::uploads::UploadError;

const DEFAULT_PAGE: usize = 1;
const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "success".to_string(),
            data,
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub code: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub type ApiResult<T> = Result<T, ApiError>;

fn error_body(status: u16, code: &str, message: String) -> ApiError {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let fields = [
        ("code", code.to_string()),
        ("message", message.clone()),
        ("status", status.as_u16().to_string()),
    ];
    if status.is_server_error() {
        Logger::error(Event::RequestFailed, &fields);
    } else {
        Logger::warn(Event::RequestRejected, &fields);
    }

    (
        status,
        Json(ErrorResponse {
            status: "error".to_string(),
            message,
            code: code.to_string(),
        }),
    )
}

/// Map a catalog failure onto the error envelope
pub fn reject(err: impl Into<CatalogError>) -> ApiError {
    let err = err.into();
    error_body(err.status_code(), err.code(), err.to_string())
}

pub fn reject_upload(err: UploadError) -> ApiError {
    error_body(err.status_code(), err.code(), err.to_string())
}

/// Malformed request that never reached the catalog
pub fn bad_request(message: impl Into<String>) -> ApiError {
    reject(CatalogError::validation(message))
}

/// `?page=&limit=` query
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: usize,
    pub limit: usize,
    pub total_items: usize,
    pub items: Vec<T>,
}

impl Pagination {
    /// Slice `items` into the requested page
    pub fn apply<T>(&self, items: Vec<T>) -> Page<T> {
        let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let total_items = items.len();
        let start = (page - 1).saturating_mul(limit);

        Page {
            page,
            limit,
            total_items,
            items: items.into_iter().skip(start).take(limit).collect(),
        }
    }
}
