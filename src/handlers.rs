// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the Masterblog API.
//!
//! Every `/api` route passes through the admission middleware first;
//! a rejected request is answered with 429 before any store dispatch.

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::store::{Direction, Post, PostStore, SortField};
use axum::{
    extract::{ConnectInfo, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared application state.
pub struct AppState {
    pub store: PostStore,
    pub limiter: RateLimiter,
    pub config: Config,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Body for post creation. Fields are optional here so a missing field
/// surfaces as a 400 from the store instead of a deserialization error.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Body for post updates. Omitted fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Query parameters for the list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}

/// Query parameters for the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Delete confirmation body.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Build the application router. `/health` sits outside the
/// rate-limited scope.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/search", get(search_posts))
        .route("/api/posts/:id", put(update_post).delete(delete_post))
        .route_layer(middleware::from_fn_with_state(state.clone(), admission));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
}

/// Admission middleware: one rate-limit check per request, keyed by
/// the client's remote address.
pub async fn admission(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    match state.limiter.admit(addr.ip()).await {
        RateLimitResult::Allowed { remaining, .. } => {
            debug!(client = %addr.ip(), remaining, "Request admitted");
            next.run(request).await
        }
        RateLimitResult::Limited { retry_after } => {
            info!(
                client = %addr.ip(),
                retry_after_secs = retry_after.as_secs(),
                "Request rate limited"
            );
            ApiError::RateLimited { retry_after }.into_response()
        }
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "masterblog-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/posts — list posts, optionally sorted.
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Post>>> {
    let sort = query
        .sort
        .as_deref()
        .map(SortField::from_str)
        .transpose()?;
    let direction = query
        .direction
        .as_deref()
        .map(Direction::from_str)
        .transpose()?
        .unwrap_or_default();

    Ok(Json(state.store.list_all(sort, direction).await))
}

/// POST /api/posts — create a post.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Post>)> {
    let post = state
        .store
        .create(req.title.as_deref(), req.content.as_deref())
        .await?;

    info!(id = post.id, title = %post.title, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/posts/:id — update title and/or content.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Post>> {
    let post = state
        .store
        .update(id, req.title.as_deref(), req.content.as_deref())
        .await?;

    info!(id, "Post updated");
    Ok(Json(post))
}

/// DELETE /api/posts/:id — remove a post permanently.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state.store.delete(id).await?;

    info!(id, "Post deleted");
    Ok(Json(DeleteResponse {
        message: format!("Post with id {id} has been deleted successfully."),
    }))
}

/// GET /api/posts/search — substring search on title and/or content.
pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Post>> {
    Json(
        state
            .store
            .search(query.title.as_deref(), query.content.as_deref())
            .await,
    )
}
