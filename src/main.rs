// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Masterblog API service
//!
//! An in-memory blog post API with per-client request rate limiting.
//!
//! ## Endpoints
//!
//! - `GET /api/posts?sort=&direction=` — list posts, optionally sorted
//! - `POST /api/posts` — create a post
//! - `PUT /api/posts/:id` — update a post
//! - `DELETE /api/posts/:id` — delete a post
//! - `GET /api/posts/search?title=&content=` — substring search
//! - `GET /health` — liveness probe (not rate limited)
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `REQUESTS_PER_WINDOW`: Max admitted requests per window per client (default: 100)
//! - `WINDOW_SECS`: Rate window length in seconds (default: 60)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use masterblog_api::{
    config::Config,
    handlers::{router, AppState},
    limiter::RateLimiter,
    store::PostStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load and validate configuration; an invalid limiter config is fatal
    let config = load_config()?;
    config.rate_limit.validate()?;
    info!(
        bind_addr = %config.bind_addr,
        requests_per_window = config.rate_limit.requests_per_window,
        window_secs = config.rate_limit.window_secs,
        "Starting Masterblog API"
    );

    // Create application state, seeded with the demo posts
    let store = PostStore::with_demo_posts().await?;

    let limiter = RateLimiter::new(config.rate_limit.clone());

    let state = Arc::new(AppState {
        store,
        limiter,
        config: config.clone(),
    });

    // Spawn cleanup task for idle client windows
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
        }
    });

    // Build router
    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server; admission is keyed by the remote address, so the
    // listener must expose connect info
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Load configuration from environment variables. An unparseable value
/// is fatal rather than silently replaced by the default.
fn load_config() -> anyhow::Result<Config> {
    Ok(Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        rate_limit: masterblog_api::config::RateLimitConfig {
            requests_per_window: env_or("REQUESTS_PER_WINDOW", 100)?,
            window_secs: env_or("WINDOW_SECS", 60)?,
        },
    })
}

/// Read and parse an environment variable, falling back to `default`
/// only when the variable is unset.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unparseable_env_value_is_fatal() {
        std::env::set_var("WINDOW_SECS", "not-a-number");
        let result = load_config();
        std::env::remove_var("WINDOW_SECS");
        assert!(result.is_err());
    }

    #[test]
    fn test_unset_env_uses_default() {
        assert_eq!(env_or("MASTERBLOG_UNSET_SENTINEL", 42u32).unwrap(), 42);
    }
}
