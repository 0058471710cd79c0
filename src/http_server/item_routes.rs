//! Catalog item HTTP Routes
//!
//! One router per item kind, mounted at `/api/v1/brochures` and
//! `/api/v1/services`. Handlers only translate HTTP to lifecycle calls.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::catalog::{ArchiveOutcome, CreateItem, ItemKind, ItemPatch, ItemView, ListQuery, Status};

use super::response::{bad_request, reject, ApiResponse, ApiResult, Page, Pagination};
use super::state::AppState;

/// Query string of the list endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub branch_id: Option<u64>,
    pub status: Option<Status>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub include_archived: bool,
}

impl ListParams {
    fn split(self) -> (Pagination, ListQuery) {
        (
            Pagination {
                page: self.page,
                limit: self.limit,
            },
            ListQuery {
                branch_id: self.branch_id,
                status: self.status,
                tag: self.tag,
                category: self.category,
                include_archived: self.include_archived,
            },
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedItem {
    pub id: u64,
}

/// Create routes for one item kind
pub fn item_routes(state: Arc<AppState>, kind: ItemKind) -> Router {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route(
            "/:id",
            get(get_handler)
                .put(update_handler)
                .patch(update_handler)
                .delete(archive_handler),
        )
        .route("/:id/restore", post(restore_handler))
        .route("/:id/permanent", delete(hard_delete_handler))
        .route("/:id/duplicate", post(duplicate_handler))
        .layer(Extension(kind))
        .with_state(state)
}

fn item_id(path: Result<Path<u64>, PathRejection>) -> ApiResult<u64> {
    path.map(|Path(id)| id)
        .map_err(|_| bad_request("Item id must be a positive integer"))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(value)| value)
        .map_err(|e| bad_request(format!("Invalid request body: {}", e.body_text())))
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<ItemKind>,
    headers: HeaderMap,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Page<ItemView>>>> {
    let Query(params) =
        params.map_err(|e| bad_request(format!("Invalid query parameters: {}", e.body_text())))?;
    let viewer = state.optional_principal(&headers).map_err(reject)?;
    let (pagination, query) = params.split();

    let items = state
        .lifecycle
        .list(kind, &query, viewer.as_ref())
        .map_err(reject)?;

    Ok(ApiResponse::success(
        pagination.apply(items),
        format!("{} list fetched", kind.label()),
    ))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<ItemKind>,
    headers: HeaderMap,
    body: Result<Json<CreateItem>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ItemView>>)> {
    let actor = state.principal(&headers).map_err(reject)?;
    let payload = json_body(body)?;

    let view = state.lifecycle.create(kind, &actor, payload).map_err(reject)?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(view, format!("{} created successfully", kind.label())),
    ))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<ItemKind>,
    headers: HeaderMap,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<ItemView>>> {
    let id = item_id(path)?;
    let viewer = state.optional_principal(&headers).map_err(reject)?;

    let view = state
        .lifecycle
        .get(kind, id, viewer.as_ref())
        .map_err(reject)?;

    Ok(ApiResponse::success(view, format!("{} fetched", kind.label())))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<ItemKind>,
    headers: HeaderMap,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<ItemPatch>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<ItemView>>> {
    let id = item_id(path)?;
    let actor = state.principal(&headers).map_err(reject)?;
    let patch = json_body(body)?;

    let view = state
        .lifecycle
        .update(kind, id, &actor, patch)
        .map_err(reject)?;

    Ok(ApiResponse::success(view, format!("{} updated successfully", kind.label())))
}

async fn archive_handler(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<ItemKind>,
    headers: HeaderMap,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<ItemView>>> {
    let id = item_id(path)?;
    let actor = state.principal(&headers).map_err(reject)?;

    let outcome = state.lifecycle.archive(kind, id, &actor).map_err(reject)?;
    let message = match &outcome {
        ArchiveOutcome::Archived(_) => format!("{} archived", kind.label()),
        ArchiveOutcome::AlreadyArchived(_) => format!("{} already archived", kind.label()),
    };
    let view = match outcome {
        ArchiveOutcome::Archived(v) | ArchiveOutcome::AlreadyArchived(v) => v,
    };

    Ok(ApiResponse::success(view, message))
}

async fn restore_handler(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<ItemKind>,
    headers: HeaderMap,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<ItemView>>> {
    let id = item_id(path)?;
    let actor = state.principal(&headers).map_err(reject)?;

    let view = state.lifecycle.restore(kind, id, &actor).map_err(reject)?;

    Ok(ApiResponse::success(view, format!("{} restored", kind.label())))
}

async fn hard_delete_handler(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<ItemKind>,
    headers: HeaderMap,
    path: Result<Path<u64>, PathRejection>,
) -> ApiResult<Json<ApiResponse<DeletedItem>>> {
    let id = item_id(path)?;
    let actor = state.principal(&headers).map_err(reject)?;

    state.lifecycle.hard_delete(kind, id, &actor).map_err(reject)?;

    Ok(ApiResponse::success(
        DeletedItem { id },
        format!("{} permanently deleted", kind.label()),
    ))
}

/// Body is optional; an empty body duplicates without overrides
async fn duplicate_handler(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<ItemKind>,
    headers: HeaderMap,
    path: Result<Path<u64>, PathRejection>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<ApiResponse<ItemView>>)> {
    let id = item_id(path)?;
    let actor = state.principal(&headers).map_err(reject)?;

    let overrides: ItemPatch = if body.iter().all(u8::is_ascii_whitespace) {
        ItemPatch::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| bad_request(format!("Invalid request body: {}", e)))?
    };

    let view = state
        .lifecycle
        .duplicate(kind, id, &actor, overrides)
        .map_err(reject)?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::success(view, format!("{} duplicated successfully", kind.label())),
    ))
}
