// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request-path error types and their HTTP mapping.
//!
//! Every error here is synchronous and recoverable by the caller; none
//! leaves the store in a partially mutated state.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the post store and the admission gate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field must not be empty: {0}")]
    EmptyField(&'static str),

    #[error("Invalid sort field: {0:?} (expected 'title' or 'content')")]
    InvalidSortField(String),

    #[error("Invalid sort direction: {0:?} (expected 'asc' or 'desc')")]
    InvalidDirection(String),

    #[error("Post with id {0} not found")]
    PostNotFound(u64),

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Duration },
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl ApiError {
    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::EmptyField(_) => "EMPTY_FIELD",
            Self::InvalidSortField(_) => "INVALID_SORT_FIELD",
            Self::InvalidDirection(_) => "INVALID_DIRECTION",
            Self::PostNotFound(_) => "POST_NOT_FOUND",
            Self::RateLimited { .. } => "RATE_LIMITED",
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_)
            | Self::EmptyField(_)
            | Self::InvalidSortField(_)
            | Self::InvalidDirection(_) => StatusCode::BAD_REQUEST,
            Self::PostNotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        match self {
            Self::RateLimited { retry_after } => {
                let retry_secs = retry_after.as_secs();
                (
                    status,
                    [("Retry-After", retry_secs.to_string())],
                    Json(ErrorResponse {
                        error: self.to_string(),
                        code,
                        retry_after_secs: Some(retry_secs),
                    }),
                )
                    .into_response()
            }
            _ => (
                status,
                Json(ErrorResponse {
                    error: self.to_string(),
                    code,
                    retry_after_secs: None,
                }),
            )
                .into_response(),
        }
    }
}

/// Result type alias for request-path operations.
pub type Result<T> = std::result::Result<T, ApiError>;
