// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Masterblog API
//!
//! A small HTTP service managing an in-memory collection of blog posts:
//!
//! - Create, list (with sort), update, delete and search posts
//! - Fixed-window request rate limiting per client address
//!
//! The store and the limiter are the two components with real logic;
//! the transport layer maps them onto `/api/posts` routes and answers
//! 400/404/429 from their error results.

pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod store;

pub use config::{Config, ConfigError};
pub use error::ApiError;
pub use limiter::{RateLimitResult, RateLimiter};
pub use store::{Direction, Post, PostStore, SortField};
