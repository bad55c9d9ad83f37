// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter keyed by client address.
//!
//! Each client gets a counter that resets at window boundaries. A
//! request arriving at or after `window_start + window` opens a fresh
//! window and is admitted; within a window, the N+1th request is
//! rejected with the time remaining to the boundary.

use crate::config::RateLimitConfig;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Result of an admission check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is admitted
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rejected
    Limited {
        /// Time until the window resets and requests are admitted again
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Per-client window state.
#[derive(Debug)]
struct ClientWindow {
    /// When the current window opened
    window_start: Instant,
    /// Admitted requests in the current window
    count: u32,
}

/// Thread-safe fixed-window rate limiter.
pub struct RateLimiter {
    config: RateLimitConfig,
    /// Per-client windows
    windows: Arc<RwLock<HashMap<IpAddr, ClientWindow>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    /// The configuration must already be validated.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check and record admission for a client.
    pub async fn admit(&self, client: IpAddr) -> RateLimitResult {
        self.admit_at(client, Instant::now()).await
    }

    /// Admission check against an explicit clock reading. `now` must
    /// not move backwards between calls for the same client.
    pub async fn admit_at(&self, client: IpAddr, now: Instant) -> RateLimitResult {
        let window = self.config.window_duration();
        let mut windows = self.windows.write().await;
        let state = windows.entry(client).or_insert(ClientWindow {
            window_start: now,
            count: 0,
        });

        // Window boundary passed: reset the counter
        if now.duration_since(state.window_start) >= window {
            state.window_start = now;
            state.count = 0;
        }

        let reset_in = window - now.duration_since(state.window_start);

        if state.count < self.config.requests_per_window {
            state.count += 1;
            let remaining = self.config.requests_per_window - state.count;
            debug!(%client, remaining, "Request admitted");
            RateLimitResult::Allowed {
                remaining,
                reset_in,
            }
        } else {
            debug!(%client, retry_after = ?reset_in, "Client rate limit exceeded");
            RateLimitResult::Limited {
                retry_after: reset_in,
            }
        }
    }

    /// Drop client entries whose window has long expired (should be
    /// called periodically).
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let window = self.config.window_duration();

        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, state| now.duration_since(state.window_start) < window);
        let dropped = before - windows.len();
        if dropped > 0 {
            debug!(dropped, "Cleaned up idle client windows");
        }
    }
}
